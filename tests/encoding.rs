use std::f32::consts::PI;
use std::io::Cursor;

use anyhow::Result;
use hound::{SampleFormat, WavReader};
use wavecut::audio::encoder::encode_wav;
use wavecut::AudioSampleBuffer;

const SAMPLE_RATE: u32 = 22_050;
const QUANTIZATION_STEP: f64 = 1.0 / 32767.0;

#[test]
fn stereo_round_trip_through_reference_decoder() -> Result<()> {
    let left = sine_wave(220.0, 0.25, 0.8);
    let right = sine_wave(330.0, 0.25, -0.6);
    let buffer = AudioSampleBuffer::new(SAMPLE_RATE, vec![left.clone(), right.clone()])?;

    let bytes = encode_wav(&buffer)?;
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, SampleFormat::Int);

    let decoded: Vec<i16> = reader.samples::<i16>().collect::<std::result::Result<_, _>>()?;
    assert_eq!(decoded.len(), left.len() * 2);
    for (frame, pair) in decoded.chunks_exact(2).enumerate() {
        let l = pair[0] as f64 / 32767.0;
        let r = pair[1] as f64 / 32767.0;
        assert!((l - left[frame] as f64).abs() <= QUANTIZATION_STEP, "left frame {frame}");
        assert!((r - right[frame] as f64).abs() <= QUANTIZATION_STEP, "right frame {frame}");
    }
    Ok(())
}

#[test]
fn out_of_range_samples_are_clamped() -> Result<()> {
    let buffer = AudioSampleBuffer::mono(8_000, vec![1.5, -2.0, 0.0])?;
    let mut reader = WavReader::new(Cursor::new(encode_wav(&buffer)?))?;
    let decoded: Vec<i16> = reader.samples::<i16>().collect::<std::result::Result<_, _>>()?;
    assert_eq!(decoded, vec![32767, -32767, 0]);
    Ok(())
}

#[test]
fn encoding_is_repeatable() -> Result<()> {
    let buffer = AudioSampleBuffer::mono(SAMPLE_RATE, sine_wave(440.0, 0.1, 0.5))?;
    assert_eq!(encode_wav(&buffer)?, encode_wav(&buffer)?);
    Ok(())
}

fn sine_wave(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let total_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..total_samples)
        .map(|index| {
            let t = index as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}
