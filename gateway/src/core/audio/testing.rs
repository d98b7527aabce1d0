//! WAV and MP3 payload builders shared by unit tests.

use std::io::Cursor;

/// A 16-bit PCM WAV payload holding `frames` frames of a quiet sine tone.
pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let value = ((i as f32 * 0.05).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// `duration_ms` of audio at the given format.
pub(crate) fn wav_for_duration(sample_rate: u32, channels: u16, duration_ms: u32) -> Vec<u8> {
    let frames = sample_rate as u64 * duration_ms as u64 / 1000;
    wav_bytes(sample_rate, channels, frames as usize)
}

/// MPEG-1 Layer III, 32 kbps, 44.1 kHz, mono, no CRC.
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x10, 0xC0];
/// 144 * 32000 / 44100, unpadded
const MP3_FRAME_LEN: usize = 104;
/// Samples decoded from each Layer III frame
pub(crate) const MP3_SAMPLES_PER_FRAME: usize = 1152;

/// An MP3 payload of `frames` silent frames at 44.1 kHz mono.
pub(crate) fn silent_mp3(frames: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(frames * MP3_FRAME_LEN);
    for _ in 0..frames {
        payload.extend_from_slice(&MP3_FRAME_HEADER);
        payload.resize(payload.len() + MP3_FRAME_LEN - MP3_FRAME_HEADER.len(), 0);
    }
    payload
}
