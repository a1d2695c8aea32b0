/// Zoom and pan state of the waveform display.
///
/// `offset` is measured in pixels of the zoomed-in content, so that
/// `visible_start = offset / width * visible_duration` and the largest valid
/// offset is `width * (zoom - 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    duration: f64,
    width: f64,
    zoom: f64,
    offset: f64,
    max_zoom: f64,
}

pub const MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 20.0;

impl Viewport {
    pub fn new(duration: f64, width: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            width: width.max(1.0),
            zoom: MIN_ZOOM,
            offset: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom.max(MIN_ZOOM);
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn max_offset(&self) -> f64 {
        self.width * (self.zoom - 1.0)
    }

    pub fn visible_duration(&self) -> f64 {
        self.duration / self.zoom
    }

    pub fn visible_start(&self) -> f64 {
        (self.offset / self.width) * self.visible_duration()
    }

    pub fn visible_end(&self) -> f64 {
        self.visible_start() + self.visible_duration()
    }

    /// Audio time under pixel `x`.
    pub fn time_at(&self, x: f64) -> f64 {
        self.visible_start() + (x / self.width) * self.visible_duration()
    }

    /// Pixel position of `time`. May fall outside `[0, width]`.
    pub fn x_at(&self, time: f64) -> f64 {
        let visible = self.visible_duration();
        if visible <= 0.0 {
            return 0.0;
        }
        ((time - self.visible_start()) / visible) * self.width
    }

    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.visible_start() && time <= self.visible_end()
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(0.0, self.max_offset());
    }

    /// Resize the canvas, keeping the visible start time.
    pub fn set_width(&mut self, width: f64) {
        let width = width.max(1.0);
        if (width - self.width).abs() < f64::EPSILON {
            return;
        }
        let start = self.visible_start();
        self.width = width;
        self.show_from(start);
    }

    /// Set the zoom, keeping the time under pixel `x` fixed (within the pan limits).
    pub fn zoom_about(&mut self, x: f64, zoom: f64) {
        let anchor = self.time_at(x);
        self.zoom = zoom.clamp(MIN_ZOOM, self.max_zoom);
        let visible = self.visible_duration();
        let start = anchor - (x / self.width) * visible;
        self.show_from(start);
    }

    /// Pan so that the window starts at `start` seconds (clamped).
    pub fn show_from(&mut self, start: f64) {
        let visible = self.visible_duration();
        if visible <= 0.0 {
            self.offset = 0.0;
            return;
        }
        self.set_offset((start / visible) * self.width);
    }

    /// Center the window on `time` (clamped).
    pub fn center_on(&mut self, time: f64) {
        let start = (time - self.visible_duration() / 2.0).max(0.0);
        self.show_from(start);
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.offset = 0.0;
    }
}
