use crate::error::{Result, SplitError};
use crate::types::AudioSampleBuffer;

/// File extension of every encoded segment.
pub const WAV_EXTENSION: &str = "wav";

pub const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;
const PCM_FORMAT: u16 = 1;

/// Encode a buffer as a canonical 16-bit little-endian PCM WAV byte stream.
///
/// Samples are interleaved channel-minor. Each sample is clamped to
/// [-1.0, 1.0], scaled by 32767 and truncated toward zero.
pub fn encode_wav(buffer: &AudioSampleBuffer) -> Result<Vec<u8>> {
    let channels = buffer.channel_count();
    let frames = buffer.len();
    let data_len = frames as u64 * channels as u64 * BYTES_PER_SAMPLE as u64;
    if data_len > u64::from(u32::MAX) - (HEADER_LEN as u64 - 8) {
        return Err(SplitError::ContainerTooLarge {
            data_bytes: data_len,
        });
    }
    let data_len = data_len as u32;
    let channel_count = u16::try_from(channels)
        .map_err(|_| SplitError::Encode(format!("{} channels do not fit the header", channels)))?;
    let sample_rate = buffer.sample_rate();
    let block_align = channel_count
        .checked_mul(BYTES_PER_SAMPLE as u16)
        .ok_or_else(|| SplitError::Encode(format!("block size overflows for {} channels", channels)))?;
    let byte_rate = sample_rate.checked_mul(u32::from(block_align)).ok_or_else(|| {
        SplitError::Encode(format!("byte rate overflows at {} Hz", sample_rate))
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(data_len + HEADER_LEN as u32 - 8).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&channel_count.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    let planes: Vec<&[f32]> = buffer.channels().collect();
    for frame in 0..frames {
        for plane in &planes {
            out.extend_from_slice(&quantize(plane[frame]).to_le_bytes());
        }
    }

    Ok(out)
}

fn quantize(sample: f32) -> i16 {
    // NaN clamps to NaN and casts to 0
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_canonical_layout() {
        let buffer = AudioSampleBuffer::new(8000, vec![vec![0.0; 3], vec![0.0; 3]]).unwrap();
        let bytes = encode_wav(&buffer).unwrap();

        assert_eq!(bytes.len(), 44 + 3 * 2 * 2);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 48);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 2);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 8000);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 32_000);
        assert_eq!(u16::from_le_bytes([bytes[32], bytes[33]]), 4);
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 12);
    }

    #[test]
    fn interleaves_channel_minor_and_clamps() {
        let buffer =
            AudioSampleBuffer::new(44_100, vec![vec![1.0, -2.0], vec![0.5, -0.5]]).unwrap();
        let bytes = encode_wav(&buffer).unwrap();
        let body: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        // 0.5 * 32767 = 16383.5 truncates to 16383
        assert_eq!(body, vec![32767, 16383, -32767, -16383]);
    }

    #[test]
    fn golden_bytes_for_tiny_mono_buffer() {
        let buffer = AudioSampleBuffer::mono(2, vec![0.25]).unwrap();
        let bytes = encode_wav(&buffer).unwrap();
        let expected: Vec<u8> = [
            &b"RIFF"[..],
            &38u32.to_le_bytes(),
            b"WAVE",
            b"fmt ",
            &16u32.to_le_bytes(),
            &1u16.to_le_bytes(),
            &1u16.to_le_bytes(),
            &2u32.to_le_bytes(),
            &4u32.to_le_bytes(),
            &2u16.to_le_bytes(),
            &16u16.to_le_bytes(),
            b"data",
            &2u32.to_le_bytes(),
            &8191i16.to_le_bytes(),
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn rejects_layouts_the_header_cannot_hold() {
        let wide = AudioSampleBuffer::new(8000, vec![Vec::new(); 70_000]).unwrap();
        assert!(matches!(encode_wav(&wide), Err(SplitError::Encode(_))));

        let many = AudioSampleBuffer::new(8000, vec![Vec::new(); 40_000]).unwrap();
        assert!(matches!(encode_wav(&many), Err(SplitError::Encode(_))));

        let fast = AudioSampleBuffer::new(u32::MAX, vec![vec![0.0], vec![0.0]]).unwrap();
        assert!(matches!(encode_wav(&fast), Err(SplitError::Encode(_))));
    }

    #[test]
    fn encoding_is_repeatable() {
        let buffer = AudioSampleBuffer::mono(16_000, (0..400).map(|i| (i as f32 / 400.0) - 0.5).collect())
            .unwrap();
        assert_eq!(encode_wav(&buffer).unwrap(), encode_wav(&buffer).unwrap());
    }
}
