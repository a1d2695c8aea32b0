use crate::config::SplitterConfig;
use crate::error::ValidationError;
use crate::types::SplitSpecification;

/// Split mode as entered by the user, before validation against the loaded audio.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRequest {
    /// Fixed interval, in minutes.
    IntervalMinutes(f64),
    /// Number of equal parts.
    Parts(u32),
    /// Marker timestamps in seconds.
    Markers(Vec<f64>),
}

impl SplitRequest {
    /// Validate the request against the audio duration and configured limits.
    pub fn validate(
        &self,
        duration: f64,
        config: &SplitterConfig,
    ) -> Result<SplitSpecification, ValidationError> {
        match self {
            SplitRequest::IntervalMinutes(minutes) => {
                if !minutes.is_finite() || *minutes <= 0.0 {
                    return Err(ValidationError::IntervalNotPositive(minutes * 60.0));
                }
                let interval = minutes * 60.0;
                if interval > duration {
                    return Err(ValidationError::IntervalExceedsDuration { interval, duration });
                }
                Ok(SplitSpecification::FixedInterval {
                    interval_seconds: interval,
                })
            }
            SplitRequest::Parts(count) => {
                if !(config.min_parts..=config.max_parts).contains(count) {
                    return Err(ValidationError::PartCountOutOfRange {
                        count: *count,
                        min: config.min_parts,
                        max: config.max_parts,
                    });
                }
                Ok(SplitSpecification::EqualParts { count: *count })
            }
            SplitRequest::Markers(timestamps) => {
                if timestamps.is_empty() {
                    return Err(ValidationError::EmptyMarkerSet);
                }
                Ok(SplitSpecification::Markers {
                    timestamps: timestamps.clone(),
                })
            }
        }
    }
}
