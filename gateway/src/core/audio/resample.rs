//! Sample-rate conversion using rubato.
//!
//! The output length is always `round(input_len * target / source)` so frame
//! boundaries computed from the target rate line up with the decoded audio.

use rubato::{FftFixedIn, Resampler};

use super::AudioError;

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Number of output samples produced for `input_len` samples.
pub fn expected_output_len(input_len: usize, source_rate: u32, target_rate: u32) -> usize {
    if source_rate == 0 {
        return 0;
    }
    ((input_len as u64 * target_rate as u64 + source_rate as u64 / 2) / source_rate as u64)
        as usize
}

/// Resample mono f32 samples from `source_rate` to `target_rate`.
pub fn resample_mono(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1,
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let wanted = expected_output_len(samples.len(), source_rate, target_rate);
    let mut output = Vec::with_capacity(wanted + delay);
    let mut pos = 0;

    // Keep feeding (zero padding past the end) until the delayed tail is out
    while output.len() < delay + wanted {
        let frames_needed = resampler.input_frames_next();
        let end = (pos + frames_needed).min(samples.len());

        let mut chunk = samples[pos.min(samples.len())..end].to_vec();
        chunk.resize(frames_needed, 0.0);
        let input = vec![chunk];

        let processed = resampler
            .process(&input, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }

        pos = end;
    }

    Ok(output[delay..delay + wanted].to_vec())
}
