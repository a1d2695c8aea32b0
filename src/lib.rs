pub mod archive;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod segmenter;
pub mod session;
pub mod types;
pub mod ui;
pub mod waveform;

pub use error::{Result, SplitError, ValidationError};
pub use naming::{Namer, NamingPattern};
pub use pipeline::{run_split, ProgressEvent, SplitPipeline};
pub use segmenter::compute_segments;
pub use session::SplitSession;
pub use types::{AudioSampleBuffer, Segment, SplitResult, SplitSpecification};
