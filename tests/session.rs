use std::io::Cursor;

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::tempdir;
use wavecut::archive::DirectoryExport;
use wavecut::audio::decoder::SourceFile;
use wavecut::config::SplitterConfig;
use wavecut::segmenter::request::SplitRequest;
use wavecut::{NamingPattern, SplitError, SplitSession, ValidationError};

const SAMPLE_RATE: u32 = 8_000;

/// Stereo 16-bit WAV: left channel ramps up, right channel is silent.
fn wav_bytes(seconds: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for i in 0..seconds * SAMPLE_RATE {
            writer.write_sample(((i % 1000) as i16) * 16)?;
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[test]
fn loads_splits_and_exports_a_wav_file() -> Result<()> {
    let mut session = SplitSession::new(SplitterConfig::default());
    let buffer = session.load(SourceFile::new("lecture.wav", "audio/wav", wav_bytes(6)?))?;
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.sample_rate(), SAMPLE_RATE);
    assert!((buffer.duration() - 6.0).abs() < 1e-9);

    let namer = session.namer("", NamingPattern::Simple);
    let results = session.split(&SplitRequest::Markers(vec![2.0, 5.0]), &namer, |_| {})?;
    let names: Vec<&str> = results.iter().map(|result| result.name.as_str()).collect();
    assert_eq!(names, vec!["lecture_part01", "lecture_part02", "lecture_part03"]);

    let temp = tempdir()?;
    let mut export = DirectoryExport::new(temp.path());
    let mut progress = Vec::new();
    session.export(&mut export, &mut |done, total| progress.push((done, total)))?;
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);

    let reader = hound::WavReader::open(temp.path().join("lecture_part02.wav"))?;
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.duration(), 3 * SAMPLE_RATE);
    Ok(())
}

#[test]
fn rejects_files_above_size_ceiling_before_decoding() -> Result<()> {
    let config = SplitterConfig {
        max_file_bytes: 1_024,
        ..SplitterConfig::default()
    };
    let mut session = SplitSession::new(config);
    let err = session
        .load(SourceFile::new("big.wav", "audio/wav", wav_bytes(1)?))
        .unwrap_err();
    assert!(matches!(
        err,
        SplitError::Validation(ValidationError::FileTooLarge { .. })
    ));
    assert!(session.buffer().is_none());
    Ok(())
}

#[test]
fn rejects_non_audio_media_type() {
    let mut session = SplitSession::new(SplitterConfig::default());
    let err = session
        .load(SourceFile::new("notes.txt", "text/plain", b"hello".to_vec()))
        .unwrap_err();
    assert!(matches!(
        err,
        SplitError::Validation(ValidationError::UnsupportedMediaType(_))
    ));
}

#[test]
fn undecodable_bytes_reset_the_session() -> Result<()> {
    let mut session = SplitSession::new(SplitterConfig::default());
    session.load(SourceFile::new("good.wav", "audio/wav", wav_bytes(1)?))?;
    assert!(session.buffer().is_some());

    let err = session
        .load(SourceFile::new("broken.mp3", "audio/mpeg", vec![0x13; 4_096]))
        .unwrap_err();
    assert!(matches!(
        err,
        SplitError::UnsupportedFormat(_) | SplitError::Decode(_)
    ));
    assert!(session.buffer().is_none());
    assert!(session.source().is_none());
    Ok(())
}

#[test]
fn validation_errors_leave_loaded_audio_usable() -> Result<()> {
    let mut session = SplitSession::new(SplitterConfig::default());
    session.load(SourceFile::new("clip.wav", "audio/wav", wav_bytes(3)?))?;
    let namer = session.namer("clip", NamingPattern::Simple);

    let err = session
        .split(&SplitRequest::IntervalMinutes(1.0), &namer, |_| {})
        .unwrap_err();
    assert!(err.is_validation());
    let err = session.plan(&SplitRequest::Parts(51), &namer).unwrap_err();
    assert!(err.is_validation());

    let plan = session.plan(&SplitRequest::Parts(3), &namer)?;
    assert_eq!(plan.len(), 3);
    Ok(())
}

#[test]
fn split_without_audio_reports_no_audio() {
    let mut session = SplitSession::new(SplitterConfig::default());
    let namer = session.namer("x", NamingPattern::Simple);
    let err = session
        .split(&SplitRequest::Parts(2), &namer, |_| {})
        .unwrap_err();
    assert!(matches!(err, SplitError::NoAudioLoaded));
}
