pub mod control_panel;
pub mod waveform;
