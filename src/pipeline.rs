//! Batch orchestration: segment, extract, encode.
//!
//! The pipeline is a stepper. Each call to [`SplitPipeline::step`] processes one
//! segment, which lets an interactive host interleave batch work with frame
//! rendering. [`SplitPipeline::run`] drives it to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::audio::encoder::encode_wav;
use crate::audio::slicer::extract_segment;
use crate::error::{Result, SplitError};
use crate::naming::Namer;
use crate::segmenter::compute_segments;
use crate::types::{AudioSampleBuffer, Segment, SplitResult, SplitSpecification};

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent<'a> {
    Started { total: usize },
    /// Emitted when the `index`-th (1-based) segment starts processing.
    Segment { index: usize, total: usize, name: &'a str },
    Finished { total: usize },
}

impl ProgressEvent<'_> {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match *self {
            ProgressEvent::Started { .. } => 0.0,
            ProgressEvent::Segment { index, total, .. } => index as f32 / total.max(1) as f32,
            ProgressEvent::Finished { .. } => 1.0,
        }
    }
}

/// Shared flag a host can flip to stop a batch between segments.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More segments remain.
    Pending,
    /// Every segment has been encoded.
    Complete,
}

pub struct SplitPipeline {
    source: Arc<AudioSampleBuffer>,
    segments: Vec<Segment>,
    next: usize,
    results: Vec<SplitResult>,
    cancel: CancellationToken,
    failed: bool,
}

impl SplitPipeline {
    /// Plan the batch. Fails with a validation error if the specification is invalid.
    pub fn new(source: Arc<AudioSampleBuffer>, spec: &SplitSpecification, namer: &Namer) -> Result<Self> {
        let segments = compute_segments(source.duration(), spec, namer)?;
        info!(
            mode = spec.label(),
            segments = segments.len(),
            duration = source.duration(),
            "split planned"
        );
        Ok(Self {
            source,
            results: Vec::with_capacity(segments.len()),
            segments,
            next: 0,
            cancel: CancellationToken::new(),
            failed: false,
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total(&self) -> usize {
        self.segments.len()
    }

    /// Number of segments already encoded.
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn is_complete(&self) -> bool {
        !self.failed && self.next >= self.segments.len()
    }

    /// Process the next segment.
    ///
    /// Any failure aborts the batch: partial results are discarded and every
    /// later call returns [`SplitError::Cancelled`].
    pub fn step<F>(&mut self, on_progress: &mut F) -> Result<StepOutcome>
    where
        F: FnMut(ProgressEvent<'_>),
    {
        if self.failed {
            return Err(SplitError::Cancelled);
        }
        let total = self.segments.len();
        if self.next >= total {
            return Ok(StepOutcome::Complete);
        }
        if self.cancel.is_cancelled() {
            return Err(self.abort(SplitError::Cancelled));
        }
        if self.next == 0 {
            on_progress(ProgressEvent::Started { total });
        }

        let segment = &self.segments[self.next];
        on_progress(ProgressEvent::Segment {
            index: self.next + 1,
            total,
            name: &segment.name,
        });

        let processed = extract_segment(&self.source, segment.start, segment.end)
            .and_then(|slice| encode_wav(&slice));
        let bytes = match processed {
            Ok(bytes) => bytes,
            Err(cause) => {
                let err = SplitError::SegmentProcessingFailed {
                    segment_name: segment.name.clone(),
                    source: Box::new(cause),
                };
                return Err(self.abort(err));
            }
        };
        debug!(
            segment = %segment.name,
            index = self.next + 1,
            total,
            bytes = bytes.len(),
            "segment encoded"
        );
        self.results
            .push(SplitResult::new(segment.name.clone(), bytes, segment.duration()));
        self.next += 1;

        if self.next == total {
            on_progress(ProgressEvent::Finished { total });
            info!(files = total, "split finished");
            Ok(StepOutcome::Complete)
        } else {
            Ok(StepOutcome::Pending)
        }
    }

    /// Run every remaining segment and return the ordered results.
    pub fn run<F>(mut self, mut on_progress: F) -> Result<Vec<SplitResult>>
    where
        F: FnMut(ProgressEvent<'_>),
    {
        while self.step(&mut on_progress)? == StepOutcome::Pending {}
        Ok(self.results)
    }

    /// Hand over the results of a completed batch.
    pub fn into_results(self) -> Option<Vec<SplitResult>> {
        self.is_complete().then_some(self.results)
    }

    fn abort(&mut self, err: SplitError) -> SplitError {
        error!(error = %err, completed = self.results.len(), "split aborted");
        self.failed = true;
        self.results.clear();
        err
    }
}

/// Segment, extract and encode `source` in one go.
pub fn run_split<F>(
    source: Arc<AudioSampleBuffer>,
    spec: &SplitSpecification,
    namer: &Namer,
    on_progress: F,
) -> Result<Vec<SplitResult>>
where
    F: FnMut(ProgressEvent<'_>),
{
    SplitPipeline::new(source, spec, namer)?.run(on_progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(seconds: usize, rate: u32) -> Arc<AudioSampleBuffer> {
        let samples = (0..seconds * rate as usize)
            .map(|i| ((i % 100) as f32 / 100.0) - 0.5)
            .collect();
        Arc::new(AudioSampleBuffer::mono(rate, samples).unwrap())
    }

    #[test]
    fn stepping_reports_one_segment_per_call() {
        let spec = SplitSpecification::EqualParts { count: 3 };
        let mut pipeline = SplitPipeline::new(tone(3, 100), &spec, &Namer::simple("a", "a")).unwrap();
        let mut seen = Vec::new();
        let mut record = |event: ProgressEvent<'_>| seen.push(format!("{event:?}"));

        assert_eq!(pipeline.step(&mut record).unwrap(), StepOutcome::Pending);
        assert_eq!(pipeline.completed(), 1);
        assert_eq!(pipeline.step(&mut record).unwrap(), StepOutcome::Pending);
        assert_eq!(pipeline.step(&mut record).unwrap(), StepOutcome::Complete);
        assert_eq!(pipeline.step(&mut record).unwrap(), StepOutcome::Complete);
        drop(record);

        assert_eq!(seen.len(), 5);
        assert!(seen[0].starts_with("Started"));
        assert!(seen[4].starts_with("Finished"));
        let results = pipeline.into_results().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].name, "a_part03");
    }

    #[test]
    fn cancelled_batch_discards_results() {
        let spec = SplitSpecification::EqualParts { count: 4 };
        let mut pipeline = SplitPipeline::new(tone(4, 100), &spec, &Namer::simple("a", "a")).unwrap();
        let token = pipeline.cancellation();
        pipeline.step(&mut |_| {}).unwrap();
        token.cancel();

        let err = pipeline.step(&mut |_| {}).unwrap_err();
        assert!(matches!(err, SplitError::Cancelled));
        assert_eq!(pipeline.completed(), 0);
        assert!(pipeline.into_results().is_none());
    }

    #[test]
    fn progress_fraction_tracks_index() {
        let event = ProgressEvent::Segment {
            index: 1,
            total: 4,
            name: "x",
        };
        assert!((event.fraction() - 0.25).abs() < f32::EPSILON);
        assert_eq!(ProgressEvent::Finished { total: 4 }.fraction(), 1.0);
    }
}
