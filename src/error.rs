//! Error taxonomy shared by the segmentation engine and its hosts.

use thiserror::Error;

/// Convenient alias for results returned by the library.
pub type Result<T> = std::result::Result<T, SplitError>;

/// Bad user input. Reported to the user; the operation is not attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("split interval must be a positive number of seconds (got {0})")]
    IntervalNotPositive(f64),

    #[error("split interval of {interval:.3}s is longer than the audio ({duration:.3}s)")]
    IntervalExceedsDuration { interval: f64, duration: f64 },

    #[error("need at least 2 parts (got {0})")]
    TooFewParts(u32),

    #[error("part count must be between {min} and {max} (got {count})")]
    PartCountOutOfRange { count: u32, min: u32, max: u32 },

    #[error("marker mode needs at least one marker")]
    EmptyMarkerSet,

    #[error("marker at {time}s lies outside the audio (0s - {duration:.3}s)")]
    MarkerOutOfRange { time: f64, duration: f64 },

    #[error("unsupported media type '{0}'")]
    UnsupportedMediaType(String),

    #[error("file is {size} bytes, above the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("invalid sample buffer: {0}")]
    InvalidBuffer(String),
}

/// Errors produced while loading, segmenting, encoding or exporting audio.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The decoder does not recognise the container or codec.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The container was recognised but its content could not be decoded.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// A time range mapped to zero samples.
    #[error("segment {start:.3}s - {end:.3}s contains no samples")]
    EmptySegment { start: f64, end: f64 },

    /// The data chunk does not fit the 32-bit RIFF size fields.
    #[error("{data_bytes} bytes of PCM data exceed the WAV size limit")]
    ContainerTooLarge { data_bytes: u64 },

    /// The buffer's layout cannot be described by a 16-bit PCM header.
    #[error("cannot encode WAV: {0}")]
    Encode(String),

    /// Extraction or encoding failed; the whole batch was aborted.
    #[error("failed to process segment '{segment_name}'")]
    SegmentProcessingFailed {
        segment_name: String,
        #[source]
        source: Box<SplitError>,
    },

    #[error("failed to export '{name}'")]
    Archive {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no audio is loaded")]
    NoAudioLoaded,

    #[error("split was cancelled")]
    Cancelled,
}

impl SplitError {
    /// Name of the segment that aborted the batch, if any.
    pub fn segment_name(&self) -> Option<&str> {
        match self {
            SplitError::SegmentProcessingFailed { segment_name, .. } => Some(segment_name),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SplitError::Validation(_))
    }
}
