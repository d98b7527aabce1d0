//! Re-segmentation of decoded PCM into bounded-duration frames.

use serde::{Deserialize, Serialize};

use super::{AudioError, BYTES_PER_SAMPLE};

/// Splits a decoded buffer into consecutive frames of a nominal duration.
///
/// The final frame may be shorter than the nominal duration; empty frames are
/// never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingPolicy {
    chunk_duration_ms: u32,
}

impl ChunkingPolicy {
    /// Create a policy; a zero duration is rejected.
    pub fn new(chunk_duration_ms: u32) -> Result<Self, AudioError> {
        if chunk_duration_ms == 0 {
            return Err(AudioError::InvalidChunkDuration);
        }
        Ok(Self { chunk_duration_ms })
    }

    pub fn chunk_duration_ms(&self) -> u32 {
        self.chunk_duration_ms
    }

    /// Samples per chunk at `sample_rate`, never less than one.
    pub fn samples_per_chunk(&self, sample_rate: u32) -> usize {
        let samples = self.chunk_duration_ms as u64 * sample_rate as u64 / 1000;
        samples.max(1) as usize
    }

    /// Split mono PCM16 bytes into chunk-sized byte slices.
    pub fn split<'a>(&self, pcm: &'a [u8], sample_rate: u32) -> impl Iterator<Item = &'a [u8]> {
        let chunk_bytes = self.samples_per_chunk(sample_rate) * BYTES_PER_SAMPLE;
        pcm.chunks(chunk_bytes).filter(|chunk| !chunk.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_rejected() {
        assert!(matches!(
            ChunkingPolicy::new(0),
            Err(AudioError::InvalidChunkDuration)
        ));
    }

    #[test]
    fn test_samples_per_chunk() {
        let policy = ChunkingPolicy::new(100).unwrap();
        assert_eq!(policy.samples_per_chunk(16000), 1600);
        assert_eq!(policy.samples_per_chunk(8000), 800);
        assert_eq!(policy.samples_per_chunk(22050), 2205);

        // Sub-sample durations still make progress
        let tiny = ChunkingPolicy::new(1).unwrap();
        assert_eq!(tiny.samples_per_chunk(500), 1);
    }

    #[test]
    fn test_350ms_into_100ms_chunks() {
        let policy = ChunkingPolicy::new(100).unwrap();
        let pcm = vec![0u8; 5600 * BYTES_PER_SAMPLE]; // 350ms at 16kHz

        let chunks: Vec<&[u8]> = policy.split(&pcm, 16000).collect();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), 3200);
        assert_eq!(chunks[1].len(), 3200);
        assert_eq!(chunks[2].len(), 3200);
        assert_eq!(chunks[3].len(), 1600);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        let policy = ChunkingPolicy::new(100).unwrap();
        let pcm = vec![0u8; 3200 * 3];
        assert_eq!(policy.split(&pcm, 16000).count(), 3);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        let policy = ChunkingPolicy::new(20).unwrap();
        assert_eq!(policy.split(&[], 16000).count(), 0);
    }
}
