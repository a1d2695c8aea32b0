use crate::error::{Result, SplitError};
use crate::types::AudioSampleBuffer;

// Absorbs float error such as 0.3 * 10.0 landing just below 3.0.
const INDEX_EPSILON: f64 = 1e-6;

/// Convert a time in seconds to a sample index (`floor(time * rate)`), clamped to `len`.
pub fn sample_index(seconds: f64, sample_rate: u32, len: usize) -> usize {
    let raw = (seconds * sample_rate as f64 + INDEX_EPSILON).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(len)
    }
}

/// Copy the samples of `[start, end)` into a new, independent buffer.
///
/// Fails with [`SplitError::EmptySegment`] when the range maps to no samples.
pub fn extract_segment(source: &AudioSampleBuffer, start: f64, end: f64) -> Result<AudioSampleBuffer> {
    let len = source.len();
    let rate = source.sample_rate();
    let start_sample = sample_index(start, rate, len);
    let end_sample = if end >= source.duration() {
        len
    } else {
        sample_index(end, rate, len)
    };

    if end_sample <= start_sample {
        return Err(SplitError::EmptySegment { start, end });
    }

    let channels = source
        .channels()
        .map(|channel| channel[start_sample..end_sample].to_vec())
        .collect();
    AudioSampleBuffer::new(rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slicing() {
        // 1 second at 44100 Hz
        let audio = AudioSampleBuffer::mono(44100, vec![0.0; 44100]).unwrap();

        let first = extract_segment(&audio, 0.0, 0.5).unwrap();
        let second = extract_segment(&audio, 0.5, 1.0).unwrap();

        assert_eq!(first.len(), 22050); // 0.5 * 44100
        assert_eq!(second.len(), 22050);
    }

    #[test]
    fn copies_every_channel_by_index() {
        let left: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let right: Vec<f32> = (0..10).map(|i| -(i as f32)).collect();
        let audio = AudioSampleBuffer::new(10, vec![left, right]).unwrap();

        let slice = extract_segment(&audio, 0.3, 0.6).unwrap();

        assert_eq!(slice.channel(0).unwrap(), &[3.0, 4.0, 5.0]);
        assert_eq!(slice.channel(1).unwrap(), &[-3.0, -4.0, -5.0]);
        assert_eq!(slice.sample_rate(), 10);
    }

    #[test]
    fn test_boundary_clamping() {
        let audio = AudioSampleBuffer::mono(1000, vec![0.0; 1000]).unwrap();

        // Range extends beyond the audio
        let chunk = extract_segment(&audio, 0.5, 2.0).unwrap();

        assert_eq!(chunk.len(), 500);
    }

    #[test]
    fn final_segment_keeps_last_sample() {
        let audio = AudioSampleBuffer::mono(44_100, vec![0.25; 5_733_001]).unwrap();
        let duration = audio.duration();
        let tail = extract_segment(&audio, 120.0, duration).unwrap();
        assert_eq!(tail.len(), 5_733_001 - 120 * 44_100);
    }

    #[test]
    fn zero_length_range_is_an_error() {
        let audio = AudioSampleBuffer::mono(8000, vec![0.0; 8000 * 20]).unwrap();
        let err = extract_segment(&audio, 10.0, 10.0).unwrap_err();
        assert!(matches!(err, SplitError::EmptySegment { .. }));
    }

    #[test]
    fn slice_is_independent_of_source() {
        let audio = AudioSampleBuffer::mono(4, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let slice = extract_segment(&audio, 0.25, 0.75).unwrap();
        drop(audio);
        assert_eq!(slice.channel(0).unwrap(), &[0.2, 0.3]);
    }
}
