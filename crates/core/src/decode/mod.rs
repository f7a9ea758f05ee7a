use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono waveform at the file's native sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSample {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSample {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::from_secs(0);
        }
        let micros = (self.samples.len() as u128 * 1_000_000u128) / u128::from(self.sample_rate);
        Duration::from_micros(micros.min(u128::from(u64::MAX)) as u64)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("unsupported audio format: {0}")]
    Unsupported(String),

    #[error("malformed audio data: {0}")]
    Malformed(String),

    #[error("no decodable audio track")]
    NoAudioTrack,

    #[error("audio track has no sample rate")]
    UnknownSampleRate,
}

impl From<SymphoniaError> for DecodeError {
    fn from(err: SymphoniaError) -> Self {
        match err {
            SymphoniaError::Unsupported(what) => Self::Unsupported(what.to_owned()),
            other => Self::Malformed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Turns an uploaded byte stream into a waveform.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: Bytes, filename_hint: Option<&str>) -> Result<AudioSample>;
}

/// Pure-Rust in-memory decoder. Multi-channel input is averaged down to mono.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaAudioDecoder;

impl SymphoniaAudioDecoder {
    pub fn new() -> Self {
        Self
    }

    fn hint_for(filename: Option<&str>) -> Hint {
        let mut hint = Hint::new();
        if let Some(ext) = filename
            .map(Path::new)
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
        {
            hint.with_extension(ext);
        }
        hint
    }

    fn downmix_into(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
        if channels <= 1 {
            out.extend_from_slice(interleaved);
            return;
        }
        let scale = 1.0 / channels as f32;
        out.extend(
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() * scale),
        );
    }
}

impl AudioDecoder for SymphoniaAudioDecoder {
    fn decode(&self, bytes: Bytes, filename_hint: Option<&str>) -> Result<AudioSample> {
        if bytes.is_empty() {
            return Err(DecodeError::Malformed("empty upload".to_owned()));
        }

        let source = MediaSourceStream::new(
            Box::new(Cursor::new(bytes)),
            MediaSourceStreamOptions::default(),
        );
        let probed = symphonia::default::get_probe().format(
            &Self::hint_for(filename_hint),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or(DecodeError::UnknownSampleRate)?;
        // No Opus codec in symphonia: WebM/Opus recordings fail here as Unsupported.
        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut samples = Vec::new();
        let mut skipped_packets = 0usize;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    Self::downmix_into(&mut samples, buf.samples(), channels);
                }
                Err(SymphoniaError::DecodeError(reason)) => {
                    skipped_packets += 1;
                    tracing::warn!(reason, "skipping undecodable audio packet");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let sample = AudioSample {
            samples,
            sample_rate,
        };
        tracing::debug!(
            sample_rate,
            samples = sample.samples.len(),
            duration_ms = sample.duration().as_millis() as u64,
            skipped_packets,
            "audio decoded"
        );
        Ok(sample)
    }
}
