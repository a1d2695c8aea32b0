pub mod decoder;
pub mod encoder;
pub mod playback;
pub mod slicer;
