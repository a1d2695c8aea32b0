use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::config::SplitterConfig;
use crate::error::{Result, SplitError, ValidationError};
use crate::types::AudioSampleBuffer;

/// Raw bytes of a user-supplied file plus its declared media type.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its media type from the extension.
    ///
    /// The size ceiling is checked against the file's metadata before any
    /// bytes are read.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &SplitterConfig) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source: std::io::Error| SplitError::Read {
            path: path.display().to_string(),
            source,
        };
        let size = std::fs::metadata(path).map_err(read_error)?.len();
        if size > config.max_file_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: config.max_file_bytes,
            }
            .into());
        }
        let bytes = std::fs::read(path).map_err(read_error)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_for_extension(path.extension().and_then(|ext| ext.to_str()));
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File name without its final extension.
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) if dot > 0 => &self.name[..dot],
            _ => &self.name,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(dot) if dot > 0 => Some(&self.name[dot + 1..]),
            _ => None,
        }
    }

    /// Reject non-audio media types and oversized files before decoding.
    pub fn validate(&self, config: &SplitterConfig) -> std::result::Result<(), ValidationError> {
        if !self.media_type.starts_with(&config.accepted_media_prefix) {
            return Err(ValidationError::UnsupportedMediaType(self.media_type.clone()));
        }
        if self.size() > config.max_file_bytes {
            return Err(ValidationError::FileTooLarge {
                size: self.size(),
                limit: config.max_file_bytes,
            });
        }
        Ok(())
    }
}

/// Map a file extension to the media type a browser would report for it.
pub fn media_type_for_extension(extension: Option<&str>) -> &'static str {
    let lower = extension.map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("aif") | Some("aiff") => "audio/aiff",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Turns raw file bytes into decoded samples.
pub trait AudioDecoder {
    fn decode(&mut self, source: &SourceFile) -> Result<AudioSampleBuffer>;
}

/// Decoder backed by Symphonia's default probe and codec registry.
///
/// Keeps every channel separate; corrupt packets are skipped.
#[derive(Default)]
pub struct SymphoniaDecoder {
    format_options: FormatOptions,
    decoder_options: DecoderOptions,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&mut self, source: &SourceFile) -> Result<AudioSampleBuffer> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(Arc::clone(&source.bytes))), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = source.extension() {
            hint.with_extension(extension);
        }
        hint.mime_type(&source.media_type);

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &self.format_options, &MetadataOptions::default())
            .map_err(|err| SplitError::UnsupportedFormat(err.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| SplitError::UnsupportedFormat("no audio tracks found".into()))?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| SplitError::Decode("sample rate not specified".into()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &self.decoder_options)
            .map_err(|err| SplitError::UnsupportedFormat(err.to_string()))?;

        let channels = decode_packets(format.as_mut(), decoder.as_mut(), track_id)?;
        debug!(
            file = %source.name,
            sample_rate,
            channels = channels.len(),
            frames = channels.first().map_or(0, Vec::len),
            "decoded source audio"
        );
        if channels.is_empty() {
            return Err(SplitError::Decode("stream contained no audio frames".into()));
        }
        AudioSampleBuffer::new(sample_rate, channels)
    }
}

fn decode_packets(
    format: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
) -> Result<Vec<Vec<f32>>> {
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(SplitError::Decode(err.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(reason, "skipping corrupt packet");
                continue;
            }
            Err(err) => return Err(SplitError::Decode(err.to_string())),
        };

        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        let spec = *decoded.spec();
        let count = spec.channels.count();
        if channels.is_empty() {
            channels = vec![Vec::new(); count];
        } else if channels.len() != count {
            return Err(SplitError::Decode(format!(
                "channel count changed mid-stream ({} -> {})",
                channels.len(),
                count
            )));
        }

        let needs_alloc = scratch
            .as_ref()
            .map_or(true, |buf| buf.capacity() < decoded.capacity() * count);
        if needs_alloc {
            scratch = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = scratch.as_mut() {
            buf.copy_planar_ref(decoded);
            let planar = buf.samples();
            for (ch, channel) in channels.iter_mut().enumerate() {
                channel.extend_from_slice(&planar[ch * frames..(ch + 1) * frames]);
            }
        }
    }

    Ok(channels)
}

/// Decoder handle owned by a session: created on first use, dropped on reset.
#[derive(Default)]
pub struct DecodeContext {
    decoder: Option<Box<dyn AudioDecoder>>,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific decoder instead of the Symphonia default.
    pub fn with_decoder(decoder: Box<dyn AudioDecoder>) -> Self {
        Self {
            decoder: Some(decoder),
        }
    }

    pub fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn decode(&mut self, source: &SourceFile) -> Result<AudioSampleBuffer> {
        let decoder = self
            .decoder
            .get_or_insert_with(|| Box::new(SymphoniaDecoder::new()));
        decoder.decode(source)
    }

    pub fn dispose(&mut self) {
        self.decoder = None;
    }
}
