//! Backend-neutral frame description of the waveform view.

use crate::types::AudioSampleBuffer;

use super::markers::MarkerSet;
use super::viewport::Viewport;

// ── Grid ──────────────────────────────────────────────────────────────────

/// Gridline spacings in seconds, smallest first.
pub const GRID_INTERVALS: &[f64] = &[0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0];
pub const MAX_GRID_LINES: f64 = 10.0;

const LABEL_SIZE: f32 = 11.0;
const PLAYHEAD_HALF_WIDTH: f32 = 6.0;
const PLAYHEAD_HEAD_HEIGHT: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const WAVEFORM: Color = Color::rgb(0x25, 0x63, 0xeb);
    pub const GRID: Color = Color::rgb(0xe5, 0xe7, 0xeb);
    pub const TEXT: Color = Color::rgb(0x6b, 0x72, 0x80);
    pub const MARKER: Color = Color::rgb(0x10, 0xb9, 0x81);
    pub const MARKER_HOVER: Color = Color::rgb(0x05, 0x96, 0x69);
    pub const PLAYHEAD: Color = Color::rgb(0xef, 0x44, 0x44);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        min: [f32; 2],
        max: [f32; 2],
        color: Color,
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        width: f32,
        color: Color,
    },
    Triangle {
        points: [[f32; 2]; 3],
        color: Color,
    },
    /// `pos` is the left end of the text baseline.
    Text {
        pos: [f32; 2],
        text: String,
        size: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    fn line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn text(&mut self, pos: [f32; 2], text: String, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos,
            text,
            size: LABEL_SIZE,
            color,
        });
    }

    /// Lines drawn in `color`.
    pub fn lines(&self, color: Color) -> impl Iterator<Item = (&[f32; 2], &[f32; 2])> + '_ {
        self.commands.iter().filter_map(move |command| match command {
            DrawCommand::Line {
                from, to, color: c, ..
            } if *c == color => Some((from, to)),
            _ => None,
        })
    }

    /// Text labels drawn in `color`, in draw order.
    pub fn labels(&self, color: Color) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, color: c, .. } if *c == color => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Smallest candidate spacing that yields at most ten gridlines.
pub fn grid_interval(visible_duration: f64) -> f64 {
    if visible_duration <= 0.0 {
        return GRID_INTERVALS[0];
    }
    GRID_INTERVALS
        .iter()
        .copied()
        .find(|&interval| visible_duration / interval <= MAX_GRID_LINES)
        .unwrap_or_else(|| (visible_duration / MAX_GRID_LINES).ceil())
}

/// `m:ss` from one minute up, `s.d` below.
pub fn format_axis_label(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u64;
    if minutes > 0 {
        let secs = (seconds - minutes as f64 * 60.0).floor() as u64;
        format!("{}:{:02}", minutes, secs)
    } else {
        let whole = seconds.max(0.0).floor();
        // epsilon keeps 2.3 from flooring to 2.2
        let tenths = (((seconds - whole) * 10.0 + 1e-6).floor() as u64).min(9);
        format!("{}.{}", whole as u64, tenths)
    }
}

/// Everything needed to draw one frame.
pub struct Scene<'a> {
    pub buffer: &'a AudioSampleBuffer,
    pub viewport: &'a Viewport,
    pub markers: &'a MarkerSet,
    pub hovered_marker: Option<usize>,
    pub playhead: f64,
    pub height: f32,
}

pub fn render(scene: &Scene<'_>) -> Frame {
    let viewport = scene.viewport;
    let width = viewport.width() as f32;
    let height = scene.height.max(1.0);
    let mut frame = Frame::new(width, height);

    frame.commands.push(DrawCommand::Fill {
        min: [0.0, 0.0],
        max: [width, height],
        color: palette::BACKGROUND,
    });

    let gridlines = gridline_times(viewport);
    for &time in &gridlines {
        let x = viewport.x_at(time) as f32;
        frame.line([x, 0.0], [x, height], 1.0, palette::GRID);
    }
    let mid = height / 2.0;
    frame.line([0.0, mid], [width, mid], 1.0, palette::GRID);

    draw_envelope(&mut frame, scene.buffer, viewport, mid);
    draw_markers(&mut frame, scene);
    draw_playhead(&mut frame, viewport, scene.playhead);

    for &time in &gridlines {
        let x = viewport.x_at(time) as f32;
        frame.text([x + 2.0, height - 4.0], format_axis_label(time), palette::TEXT);
    }
    frame
}

fn gridline_times(viewport: &Viewport) -> Vec<f64> {
    let interval = grid_interval(viewport.visible_duration());
    let start = viewport.visible_start();
    let end = viewport.visible_end().min(viewport.duration());
    let first = (start / interval).ceil() as u64;
    (first..)
        .map(|step| step as f64 * interval)
        .take_while(|&time| time <= end + 1e-9)
        .collect()
}

/// One vertical min/max stroke per pixel column, across all channels.
fn draw_envelope(frame: &mut Frame, buffer: &AudioSampleBuffer, viewport: &Viewport, mid: f32) {
    let len = buffer.len();
    if len == 0 {
        return;
    }
    let rate = buffer.sample_rate() as f64;
    let columns = viewport.width().ceil() as usize;
    for column in 0..columns {
        let x = column as f64;
        let first = (viewport.time_at(x) * rate).floor().max(0.0) as usize;
        if first >= len {
            break;
        }
        let last = ((viewport.time_at(x + 1.0) * rate).floor() as usize).clamp(first + 1, len);

        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for channel in buffer.channels() {
            for &sample in &channel[first..last] {
                lo = lo.min(sample);
                hi = hi.max(sample);
            }
        }
        let top = mid - hi.clamp(-1.0, 1.0) * mid;
        let bottom = (mid - lo.clamp(-1.0, 1.0) * mid).max(top + 1.0);
        let px = column as f32 + 0.5;
        frame.line([px, top], [px, bottom], 1.0, palette::WAVEFORM);
    }
}

fn draw_markers(frame: &mut Frame, scene: &Scene<'_>) {
    let viewport = scene.viewport;
    for (idx, &time) in scene.markers.as_slice().iter().enumerate() {
        if !viewport.contains_time(time) {
            continue;
        }
        let color = if scene.hovered_marker == Some(idx) {
            palette::MARKER_HOVER
        } else {
            palette::MARKER
        };
        let x = viewport.x_at(time) as f32;
        frame.line([x, 0.0], [x, frame.height], 2.0, color);
        frame.text([x + 4.0, 16.0], (idx + 1).to_string(), color);
    }
}

fn draw_playhead(frame: &mut Frame, viewport: &Viewport, playhead: f64) {
    if !viewport.contains_time(playhead) {
        return;
    }
    let x = viewport.x_at(playhead) as f32;
    frame.line([x, 0.0], [x, frame.height], 2.0, palette::PLAYHEAD);
    frame.commands.push(DrawCommand::Triangle {
        points: [
            [x - PLAYHEAD_HALF_WIDTH, 0.0],
            [x + PLAYHEAD_HALF_WIDTH, 0.0],
            [x, PLAYHEAD_HEAD_HEIGHT],
        ],
        color: palette::PLAYHEAD,
    });
}
