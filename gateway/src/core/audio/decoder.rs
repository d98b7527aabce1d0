//! Compressed payload decoding using symphonia.
//!
//! The container is detected by probing the byte stream, so MP3 (what the
//! synthesis service returns) and WAV/PCM payloads go through the same path.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::AudioError;

/// Decoded, still interleaved audio at the payload's native format.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved f32 samples in the range [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Native sample rate of the payload
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: usize,
}

impl DecodedAudio {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }
}

/// Decode a compressed payload into interleaved f32 samples.
pub fn decode(payload: &[u8]) -> Result<DecodedAudio, AudioError> {
    if payload.is_empty() {
        return Err(AudioError::EmptyPayload);
    }

    let source = Cursor::new(payload.to_vec());
    let stream = MediaSourceStream::new(Box::new(source), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut samples = Vec::new();
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Malformed(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = Some(spec.rate);
                channels = Some(spec.channels.count());

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // A corrupt frame inside an otherwise valid stream is skipped
            Err(SymphoniaError::DecodeError(e)) => {
                skipped_packets += 1;
                warn!(error = %e, "Skipping undecodable audio packet");
            }
            Err(e) => return Err(AudioError::Malformed(e.to_string())),
        }
    }

    let sample_rate = sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| AudioError::Malformed("payload has no sample rate".to_string()))?;
    let channels = channels
        .filter(|count| *count > 0)
        .ok_or_else(|| AudioError::Malformed("payload has no channel layout".to_string()))?;

    if samples.is_empty() && skipped_packets > 0 {
        return Err(AudioError::Malformed(format!(
            "all {skipped_packets} audio packets failed to decode"
        )));
    }

    debug!(
        sample_rate,
        channels,
        samples = samples.len(),
        "Decoded compressed audio payload"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Average interleaved channels down to a single channel.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Convert f32 samples to 16-bit signed little-endian PCM bytes.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::testing::wav_bytes;

    #[test]
    fn test_decode_wav_reports_native_format() {
        let decoded = decode(&wav_bytes(22050, 2, 2205)).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.frames(), 2205);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode(b"this is definitely not an audio payload");
        assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        assert!(matches!(decode(&[]), Err(AudioError::EmptyPayload)));
    }

    #[test]
    fn test_downmix_averages_channels() {
        let stereo = [0.5, -0.5, 1.0, 0.0];
        assert_eq!(downmix_to_mono(&stereo, 2), vec![0.0, 0.5]);
    }

    #[test]
    fn test_downmix_mono_is_identity() {
        let mono = [0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&mono, 1), mono.to_vec());
    }

    #[test]
    fn test_pcm16_conversion_clamps() {
        let bytes = f32_to_pcm16(&[1.5, -2.0, 0.0]);
        assert_eq!(bytes.len(), 6);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), 0);
    }
}
