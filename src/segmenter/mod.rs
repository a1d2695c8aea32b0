pub mod request;


use crate::error::{Result, ValidationError};
use crate::naming::Namer;
use crate::types::{Segment, SplitSpecification};

/// Marker timestamps closer than this are treated as the same split point.
pub const MARKER_MERGE_EPSILON: f64 = 1e-6;

/// Pure function turning a duration and a split specification into ordered,
/// named segments.
pub fn compute_segments(duration: f64, spec: &SplitSpecification, namer: &Namer) -> Result<Vec<Segment>> {
    let ranges = match spec {
        SplitSpecification::FixedInterval { interval_seconds } => {
            interval_ranges(duration, *interval_seconds)?
        }
        SplitSpecification::EqualParts { count } => part_ranges(duration, *count)?,
        SplitSpecification::Markers { timestamps } => marker_ranges(duration, timestamps)?,
    };

    Ok(ranges
        .into_iter()
        .enumerate()
        .map(|(idx, (start, end))| Segment {
            start,
            end,
            name: namer.name(idx + 1, start, end),
        })
        .collect())
}

fn interval_ranges(duration: f64, interval: f64) -> Result<Vec<(f64, f64)>> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(ValidationError::IntervalNotPositive(interval).into());
    }
    if interval > duration {
        return Err(ValidationError::IntervalExceedsDuration { interval, duration }.into());
    }

    let mut ranges = Vec::new();
    let mut idx = 0u64;
    let mut start = 0.0;
    // multiply instead of accumulating so long batches do not drift
    while start < duration {
        let mut end = ((idx + 1) as f64 * interval).min(duration);
        // a remainder below the merge epsilon would be a sub-sample tail
        if duration - end < MARKER_MERGE_EPSILON {
            end = duration;
        }
        ranges.push((start, end));
        idx += 1;
        start = end;
    }
    Ok(ranges)
}

fn part_ranges(duration: f64, count: u32) -> Result<Vec<(f64, f64)>> {
    if count < 2 {
        return Err(ValidationError::TooFewParts(count).into());
    }
    let part = duration / count as f64;
    Ok((0..count)
        .map(|i| {
            let start = i as f64 * part;
            let end = if i + 1 == count {
                duration
            } else {
                ((i + 1) as f64 * part).min(duration)
            };
            (start, end)
        })
        .collect())
}

fn marker_ranges(duration: f64, timestamps: &[f64]) -> Result<Vec<(f64, f64)>> {
    if timestamps.is_empty() {
        return Err(ValidationError::EmptyMarkerSet.into());
    }
    if let Some(&time) = timestamps
        .iter()
        .find(|&&t| !t.is_finite() || t < 0.0 || t > duration)
    {
        return Err(ValidationError::MarkerOutOfRange { time, duration }.into());
    }

    let mut sorted = timestamps.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|later, earlier| (*later - *earlier).abs() < MARKER_MERGE_EPSILON);

    let mut bounds = Vec::with_capacity(sorted.len() + 2);
    if sorted[0] > MARKER_MERGE_EPSILON {
        bounds.push(0.0);
    }
    bounds.extend_from_slice(&sorted);
    if let Some(&last) = sorted.last() {
        if duration - last > MARKER_MERGE_EPSILON {
            bounds.push(duration);
        }
    }

    Ok(bounds.windows(2).map(|pair| (pair[0], pair[1])).collect())
}

/// Check that segments are ordered, contiguous and cover `[0, duration)`.
pub fn covers_exactly(segments: &[Segment], duration: f64) -> bool {
    let Some(first) = segments.first() else {
        return false;
    };
    let Some(last) = segments.last() else {
        return false;
    };
    first.start == 0.0
        && last.end == duration
        && segments.windows(2).all(|pair| pair[0].end == pair[1].start)
        && segments.iter().all(|segment| segment.start < segment.end)
}
