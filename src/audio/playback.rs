use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rodio::source::Source;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use crate::types::AudioSampleBuffer;

/// Interleaved copy of a buffer, built once per loaded file and shared by
/// every source the player creates from it.
#[derive(Debug, Clone)]
pub struct PlaybackClip {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl PlaybackClip {
    pub fn new(buffer: &AudioSampleBuffer) -> Result<Self> {
        let channels = u16::try_from(buffer.channel_count())
            .with_context(|| format!("{} channels are too many to play", buffer.channel_count()))?;
        Ok(Self {
            samples: interleave(buffer).into(),
            channels,
            sample_rate: buffer.sample_rate(),
        })
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Source positioned at the frame containing `position` seconds.
    pub fn source_from(&self, position: f64) -> ClipSource {
        let frame = (position.max(0.0) * self.sample_rate as f64).floor() as usize;
        ClipSource {
            clip: self.clone(),
            cursor: frame.min(self.frames()) * usize::from(self.channels),
        }
    }
}

/// rodio source reading a [`PlaybackClip`] without copying it.
pub struct ClipSource {
    clip: PlaybackClip,
    cursor: usize,
}

impl Iterator for ClipSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.clip.samples.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.clip.samples.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl Source for ClipSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.clip.samples.len().saturating_sub(self.cursor))
    }

    fn channels(&self) -> u16 {
        self.clip.channels
    }

    fn sample_rate(&self) -> u32 {
        self.clip.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        let remaining = self.clip.samples.len().saturating_sub(self.cursor);
        let frames = remaining / usize::from(self.clip.channels.max(1));
        Some(Duration::from_secs_f64(frames as f64 / self.clip.sample_rate as f64))
    }
}

/// Wall-clock playback position, independent of the output device.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    started: Option<(Instant, f64)>,
    paused_at: f64,
    duration: f64,
}

impl Transport {
    pub fn start(&mut self, position: f64, duration: f64, now: Instant) {
        self.duration = duration;
        self.started = Some((now, position.clamp(0.0, duration)));
    }

    pub fn pause(&mut self, now: Instant) {
        self.paused_at = self.position(now);
        self.started = None;
    }

    pub fn seek(&mut self, position: f64) {
        self.paused_at = position.max(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn position(&self, now: Instant) -> f64 {
        match self.started {
            Some((at, from)) => (from + now.saturating_duration_since(at).as_secs_f64()).min(self.duration),
            None => self.paused_at,
        }
    }

    /// The source ran out: stop and rewind to the start.
    pub fn finish(&mut self) {
        self.started = None;
        self.paused_at = 0.0;
    }
}

/// Audio output for the editor. The playback position is derived from the
/// wall clock, so the view only observes it and never drives it.
pub struct Player {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    transport: Transport,
}

impl Player {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().context("failed to open output stream")?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            transport: Transport::default(),
        })
    }

    /// Start playing `clip` from `position` seconds.
    pub fn play_from(&mut self, clip: &PlaybackClip, position: f64) -> Result<()> {
        self.stop_sink();
        let position = position.clamp(0.0, clip.duration());
        let sink = Sink::try_new(&self.handle).context("failed to create sink")?;
        sink.append(clip.source_from(position));
        sink.play();
        debug!(position, "playback started");
        self.sink = Some(sink);
        self.transport.start(position, clip.duration(), Instant::now());
        Ok(())
    }

    pub fn pause(&mut self) {
        self.transport.pause(Instant::now());
        self.stop_sink();
    }

    /// Move the resume position without starting playback.
    pub fn seek(&mut self, position: f64) {
        self.transport.seek(position);
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_running() && self.sink.as_ref().map_or(false, |sink| !sink.empty())
    }

    /// Current playback position in seconds.
    pub fn position(&self) -> f64 {
        self.transport.position(Instant::now())
    }

    /// Called once per frame; rewinds to the start when the source ran out.
    pub fn poll(&mut self) -> f64 {
        if self.transport.is_running() && !self.is_playing() {
            self.stop_sink();
            self.transport.finish();
        }
        self.position()
    }

    fn stop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Interleave planar channels into the frame-major layout rodio expects.
pub fn interleave(buffer: &AudioSampleBuffer) -> Vec<f32> {
    let planes: Vec<&[f32]> = buffer.channels().collect();
    let mut output = Vec::with_capacity(buffer.len() * planes.len());
    for frame in 0..buffer.len() {
        for plane in &planes {
            output.push(plane[frame]);
        }
    }
    output
}
