//! Explicit per-user session: the loaded file, its decoded audio, the decode
//! handle, the playback position and the last batch's results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::archive::Archiver;
use crate::audio::decoder::{DecodeContext, SourceFile};
use crate::config::SplitterConfig;
use crate::error::{Result, SplitError};
use crate::naming::{Namer, NamingPattern, SystemClock};
use crate::pipeline::{ProgressEvent, SplitPipeline};
use crate::segmenter::compute_segments;
use crate::segmenter::request::SplitRequest;
use crate::types::{AudioSampleBuffer, Segment, SplitResult};

/// Metadata of the loaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub name: String,
    pub base_name: String,
    pub media_type: String,
    pub size: u64,
}

pub struct SplitSession {
    config: SplitterConfig,
    decode: DecodeContext,
    source: Option<SourceInfo>,
    buffer: Option<Arc<AudioSampleBuffer>>,
    playback_position: f64,
    results: Vec<SplitResult>,
}

impl SplitSession {
    pub fn new(config: SplitterConfig) -> Self {
        Self::with_decode_context(config, DecodeContext::new())
    }

    pub fn with_decode_context(config: SplitterConfig, decode: DecodeContext) -> Self {
        Self {
            config,
            decode,
            source: None,
            buffer: None,
            playback_position: 0.0,
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Validate and decode `file`. On any failure the session is reset.
    pub fn load(&mut self, file: SourceFile) -> Result<Arc<AudioSampleBuffer>> {
        self.reset();
        if let Err(err) = file.validate(&self.config) {
            warn!(file = %file.name, error = %err, "rejected source file");
            return Err(err.into());
        }
        let buffer = match self.decode.decode(&file) {
            Ok(buffer) => Arc::new(buffer),
            Err(err) => {
                warn!(file = %file.name, error = %err, "failed to decode source file");
                self.reset();
                return Err(err);
            }
        };
        info!(
            file = %file.name,
            size = file.size(),
            duration = buffer.duration(),
            channels = buffer.channel_count(),
            sample_rate = buffer.sample_rate(),
            "source loaded"
        );
        self.source = Some(SourceInfo {
            name: file.name.clone(),
            base_name: file.base_name().to_string(),
            media_type: file.media_type.clone(),
            size: file.size(),
        });
        self.buffer = Some(Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Adopt audio that was decoded elsewhere.
    pub fn load_decoded(&mut self, info: SourceInfo, buffer: AudioSampleBuffer) -> Arc<AudioSampleBuffer> {
        self.reset();
        let buffer = Arc::new(buffer);
        self.source = Some(info);
        self.buffer = Some(Arc::clone(&buffer));
        buffer
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    pub fn buffer(&self) -> Option<&Arc<AudioSampleBuffer>> {
        self.buffer.as_ref()
    }

    pub fn duration(&self) -> Option<f64> {
        self.buffer.as_ref().map(|buffer| buffer.duration())
    }

    pub fn playback_position(&self) -> f64 {
        self.playback_position
    }

    pub fn set_playback_position(&mut self, seconds: f64) {
        let limit = self.duration().unwrap_or(0.0);
        self.playback_position = seconds.clamp(0.0, limit);
    }

    /// Namer for this session's file. An empty prefix falls back to the file's base name.
    pub fn namer(&self, prefix: &str, pattern: NamingPattern) -> Namer {
        let original = self
            .source
            .as_ref()
            .map(|info| info.base_name.as_str())
            .unwrap_or("audio");
        Namer::new(prefix, original, pattern, &SystemClock)
    }

    /// Segment preview for `request`, without extracting anything.
    pub fn plan(&self, request: &SplitRequest, namer: &Namer) -> Result<Vec<Segment>> {
        let buffer = self.loaded()?;
        let spec = request.validate(buffer.duration(), &self.config)?;
        compute_segments(buffer.duration(), &spec, namer)
    }

    /// Validate `request` and prepare a pipeline the caller can step.
    pub fn start_split(&mut self, request: &SplitRequest, namer: &Namer) -> Result<SplitPipeline> {
        let buffer = Arc::clone(self.loaded()?);
        let spec = request.validate(buffer.duration(), &self.config)?;
        self.results.clear();
        SplitPipeline::new(buffer, &spec, namer)
    }

    /// Run a whole batch and keep its results.
    pub fn split<F>(&mut self, request: &SplitRequest, namer: &Namer, on_progress: F) -> Result<&[SplitResult]>
    where
        F: FnMut(ProgressEvent<'_>),
    {
        let pipeline = self.start_split(request, namer)?;
        self.results = pipeline.run(on_progress)?;
        Ok(&self.results)
    }

    /// Keep the results of a pipeline the caller stepped to completion.
    pub fn finish_split(&mut self, pipeline: SplitPipeline) -> &[SplitResult] {
        self.results = pipeline.into_results().unwrap_or_default();
        &self.results
    }

    pub fn results(&self) -> &[SplitResult] {
        &self.results
    }

    /// Export the current results. Failures leave them in place.
    pub fn export(
        &self,
        archiver: &mut dyn Archiver,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        archiver.write_all(&self.results, on_progress)
    }

    /// Drop the loaded audio, results and decode handle.
    pub fn reset(&mut self) {
        self.source = None;
        self.buffer = None;
        self.playback_position = 0.0;
        self.results.clear();
        self.decode.dispose();
    }

    fn loaded(&self) -> Result<&Arc<AudioSampleBuffer>> {
        self.buffer
            .as_ref()
            .ok_or(SplitError::NoAudioLoaded)
    }
}
