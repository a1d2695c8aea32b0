//! Interactive waveform with zoom, pan, split markers and a playhead.
//!
//! [`WaveformView`] owns the viewport and the marker set; every mutation goes
//! through its own methods. The outside world hears about it through
//! [`ViewEvent`]s returned from [`WaveformView::handle`] and the marker methods.

pub mod gesture;
pub mod markers;
pub mod render;
pub mod viewport;

use std::sync::Arc;

use tracing::debug;

use crate::config::SplitterConfig;
use crate::types::AudioSampleBuffer;

use gesture::{transition, Effect, GestureConfig, InputEvent, Mode};
use markers::MarkerSet;
use render::{Frame, Scene};
use viewport::Viewport;

pub const DEFAULT_HEIGHT: f32 = 160.0;

/// Notifications for the surrounding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Seek(f64),
    MarkersChanged(Vec<f64>),
}

pub struct WaveformView {
    buffer: Arc<AudioSampleBuffer>,
    viewport: Viewport,
    markers: MarkerSet,
    mode: Mode,
    gestures: GestureConfig,
    hit_tolerance: f64,
    hovered: Option<usize>,
    playhead: f64,
    height: f32,
}

impl WaveformView {
    pub fn new(buffer: Arc<AudioSampleBuffer>, width: f64) -> Self {
        Self::with_config(buffer, width, &SplitterConfig::default())
    }

    pub fn with_config(buffer: Arc<AudioSampleBuffer>, width: f64, config: &SplitterConfig) -> Self {
        let viewport = Viewport::new(buffer.duration(), width).with_max_zoom(config.max_zoom);
        Self {
            buffer,
            viewport,
            markers: MarkerSet::new(),
            mode: Mode::Idle,
            gestures: GestureConfig::from_config(config),
            hit_tolerance: config.marker_hit_tolerance_px,
            hovered: None,
            playhead: 0.0,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn buffer(&self) -> &Arc<AudioSampleBuffer> {
        &self.buffer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn markers(&self) -> &[f64] {
        self.markers.as_slice()
    }

    pub fn hovered_marker(&self) -> Option<usize> {
        self.hovered
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn duration(&self) -> f64 {
        self.viewport.duration()
    }

    /// Feed one input event through the gesture recognizer and apply its effects.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<ViewEvent> {
        let (mode, effects) = transition(&self.mode, event, &self.viewport, &self.gestures);
        if mode.name() != self.mode.name() {
            debug!(from = self.mode.name(), to = mode.name(), "gesture mode changed");
        }
        self.mode = mode;

        let mut events = Vec::new();
        for effect in effects {
            events.extend(self.apply(effect));
        }
        match *event {
            InputEvent::Down { pointer, .. } | InputEvent::Move { pointer, .. } => {
                self.hover(Some(pointer.x))
            }
            InputEvent::Cancel { .. } => self.hover(None),
            _ => {}
        }
        events
    }

    fn apply(&mut self, effect: Effect) -> Option<ViewEvent> {
        match effect {
            Effect::Pan { offset } => {
                self.viewport.set_offset(offset);
                None
            }
            Effect::ZoomAbout { x, zoom } => {
                self.viewport.zoom_about(x, zoom);
                None
            }
            Effect::AddMarkerAt { x } => self.add_marker(self.viewport.time_at(x)),
            Effect::RemoveMarkerNear { x } => {
                let idx = self.markers.hit_test(&self.viewport, x, self.hit_tolerance)?;
                self.remove_marker(idx)
            }
            Effect::SeekTo { x } => {
                let time = self.viewport.time_at(x).clamp(0.0, self.duration());
                Some(ViewEvent::Seek(time))
            }
        }
    }

    /// Update the hovered marker for pointer position `x` (`None` when the pointer left).
    pub fn hover(&mut self, x: Option<f64>) {
        self.hovered = x.and_then(|x| self.markers.hit_test(&self.viewport, x, self.hit_tolerance));
    }

    /// Add a marker at `time`. Returns the change notification when the set changed.
    pub fn add_marker(&mut self, time: f64) -> Option<ViewEvent> {
        if !self.markers.insert(time, self.duration()) {
            return None;
        }
        debug!(time, markers = self.markers.len(), "marker added");
        self.hovered = None;
        Some(self.markers_changed())
    }

    pub fn remove_marker(&mut self, index: usize) -> Option<ViewEvent> {
        let time = self.markers.remove(index)?;
        debug!(time, markers = self.markers.len(), "marker removed");
        self.hovered = None;
        Some(self.markers_changed())
    }

    pub fn set_markers(&mut self, times: &[f64]) -> ViewEvent {
        self.markers = MarkerSet::from_times(times, self.duration());
        self.hovered = None;
        self.markers_changed()
    }

    pub fn clear_markers(&mut self) -> ViewEvent {
        self.set_markers(&[])
    }

    fn markers_changed(&self) -> ViewEvent {
        ViewEvent::MarkersChanged(self.markers.to_vec())
    }

    /// Move the playhead. When zoomed in and the playhead leaves the visible
    /// window, the view recenters on it.
    pub fn set_playhead(&mut self, time: f64) {
        self.playhead = time.clamp(0.0, self.duration());
        if self.viewport.zoom() > 1.0 && !self.viewport.contains_time(self.playhead) {
            self.viewport.center_on(self.playhead);
        }
    }

    pub fn zoom_about(&mut self, x: f64, zoom: f64) {
        self.viewport.zoom_about(x, zoom);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    pub fn resize(&mut self, width: f64, height: f32) {
        self.viewport.set_width(width);
        self.height = height;
    }

    pub fn render(&self) -> Frame {
        render::render(&Scene {
            buffer: &self.buffer,
            viewport: &self.viewport,
            markers: &self.markers,
            hovered_marker: self.hovered,
            playhead: self.playhead,
            height: self.height,
        })
    }
}
