//! Audio frame normalization.
//!
//! Turns a compressed synthesis payload into mono 16-bit PCM frames at a fixed
//! output sample rate, optionally re-segmented by a [`ChunkingPolicy`].

pub mod chunker;
pub mod decoder;
pub mod resample;

#[cfg(test)]
pub(crate) mod testing;

pub use chunker::ChunkingPolicy;
pub use decoder::{DecodedAudio, decode, downmix_to_mono, f32_to_pcm16};
pub use resample::{expected_output_len, resample_mono};

use thiserror::Error;
use tracing::debug;

use crate::core::tts::AudioData;

/// Output channel count; frames are always mono.
pub const OUTPUT_CHANNELS: u16 = 1;

/// Output bit depth in bytes per sample (16-bit).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Format tag carried by every normalized frame.
pub const PCM16_FORMAT: &str = "pcm16";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio payload is empty")]
    EmptyPayload,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio payload contains no decodable track")]
    NoAudioTrack,

    #[error("Malformed audio payload: {0}")]
    Malformed(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Chunk duration must be greater than zero")]
    InvalidChunkDuration,

    #[error("Audio worker failed: {0}")]
    Worker(String),
}

/// Decodes payloads into frames that all share one sample rate and channel
/// count, regardless of what the payload itself carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioNormalizer {
    sample_rate: u32,
}

impl AudioNormalizer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Decode, downmix, resample and slice a payload.
    ///
    /// Without a policy the whole utterance becomes a single frame. Audio that
    /// decodes to zero samples yields no frames at all.
    pub fn normalize(
        &self,
        payload: &[u8],
        chunking: Option<ChunkingPolicy>,
    ) -> Result<Vec<AudioData>, AudioError> {
        let decoded = decode(payload)?;
        let mono = downmix_to_mono(&decoded.samples, decoded.channels);
        let resampled = resample_mono(&mono, decoded.sample_rate, self.sample_rate)?;
        let pcm = f32_to_pcm16(&resampled);

        debug!(
            source_rate = decoded.sample_rate,
            source_channels = decoded.channels,
            target_rate = self.sample_rate,
            pcm_bytes = pcm.len(),
            "Normalized audio payload"
        );

        if pcm.is_empty() {
            return Ok(Vec::new());
        }

        let frames = match chunking {
            Some(policy) => policy
                .split(&pcm, self.sample_rate)
                .map(|chunk| self.frame(chunk.to_vec()))
                .collect(),
            None => vec![self.frame(pcm)],
        };

        Ok(frames)
    }

    /// Run [`normalize`](Self::normalize) on the blocking thread pool.
    pub async fn normalize_async(
        &self,
        payload: Vec<u8>,
        chunking: Option<ChunkingPolicy>,
    ) -> Result<Vec<AudioData>, AudioError> {
        let normalizer = *self;
        tokio::task::spawn_blocking(move || normalizer.normalize(&payload, chunking))
            .await
            .map_err(|e| AudioError::Worker(e.to_string()))?
    }

    fn frame(&self, data: Vec<u8>) -> AudioData {
        let samples = data.len() / BYTES_PER_SAMPLE;
        let duration_ms = (samples as u64 * 1000 / self.sample_rate.max(1) as u64) as u32;
        AudioData {
            data,
            sample_rate: self.sample_rate,
            channels: OUTPUT_CHANNELS,
            format: PCM16_FORMAT.to_string(),
            duration_ms: Some(duration_ms),
        }
    }
}
