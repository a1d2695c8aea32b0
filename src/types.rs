//! Core types for the wavecut segmentation engine

use crate::error::{Result, ValidationError};

/// Decoded multi-channel audio (f32 samples, one vector per channel)
///
/// Buffers are never mutated after construction. Slicing produces a new,
/// independently owned buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioSampleBuffer {
    /// Build a buffer, checking that the sample rate is positive and that
    /// every channel holds the same number of samples.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ValidationError::InvalidBuffer("sample rate must be positive".into()).into());
        }
        let Some(first) = channels.first() else {
            return Err(ValidationError::InvalidBuffer("buffer has no channels".into()).into());
        };
        let length = first.len();
        if let Some(idx) = channels.iter().position(|channel| channel.len() != length) {
            return Err(ValidationError::InvalidBuffer(format!(
                "channel {} holds {} samples, expected {}",
                idx,
                channels[idx].len(),
                length
            ))
            .into());
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Single-channel convenience constructor.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds (`len / sample_rate`).
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }
}

/// A contiguous time range destined to become one output file
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64, // seconds
    pub end: f64,   // seconds
    pub name: String,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// How the source should be divided
#[derive(Debug, Clone, PartialEq)]
pub enum SplitSpecification {
    /// Consecutive segments of `interval_seconds`; the last one may be shorter.
    FixedInterval { interval_seconds: f64 },
    /// `count` segments of equal length.
    EqualParts { count: u32 },
    /// Split at each timestamp (seconds).
    Markers { timestamps: Vec<f64> },
}

impl SplitSpecification {
    pub fn label(&self) -> &'static str {
        match self {
            SplitSpecification::FixedInterval { .. } => "interval",
            SplitSpecification::EqualParts { .. } => "parts",
            SplitSpecification::Markers { .. } => "markers",
        }
    }
}

/// One encoded output file
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// File name without extension
    pub name: String,
    pub encoded_bytes: Vec<u8>,
    pub duration_seconds: f64,
    pub byte_size: usize,
}

impl SplitResult {
    pub fn new(name: String, encoded_bytes: Vec<u8>, duration_seconds: f64) -> Self {
        let byte_size = encoded_bytes.len();
        Self {
            name,
            encoded_bytes,
            duration_seconds,
            byte_size,
        }
    }

    /// Name including the container extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, crate::audio::encoder::WAV_EXTENSION)
    }
}
