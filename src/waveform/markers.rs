use super::viewport::Viewport;

/// Timestamps closer than this (seconds) count as the same marker.
pub const DUPLICATE_TOLERANCE: f64 = 1e-3;

/// Sorted, de-duplicated split markers (seconds).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    times: Vec<f64>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary timestamps, dropping out-of-range values and duplicates.
    pub fn from_times(times: &[f64], duration: f64) -> Self {
        let mut set = Self::new();
        for &time in times {
            set.insert(time, duration);
        }
        set
    }

    /// Insert a marker strictly inside `(0, duration)`.
    ///
    /// Returns false when the time is out of range or duplicates an existing marker.
    pub fn insert(&mut self, time: f64, duration: f64) -> bool {
        if !time.is_finite() || time <= 0.0 || time >= duration {
            return false;
        }
        let idx = self.times.partition_point(|&existing| existing < time);
        let near_prev = idx > 0 && time - self.times[idx - 1] < DUPLICATE_TOLERANCE;
        let near_next = idx < self.times.len() && self.times[idx] - time < DUPLICATE_TOLERANCE;
        if near_prev || near_next {
            return false;
        }
        self.times.insert(idx, time);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<f64> {
        (index < self.times.len()).then(|| self.times.remove(index))
    }

    /// Index of the marker drawn closest to pixel `x`, within `tolerance` pixels.
    pub fn hit_test(&self, viewport: &Viewport, x: f64, tolerance: f64) -> Option<usize> {
        self.times
            .iter()
            .enumerate()
            .map(|(idx, &time)| (idx, (viewport.x_at(time) - x).abs()))
            .filter(|&(_, distance)| distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.times.clone()
    }
}
