//! Audio Test Fixtures
//!
//! Programmatically generated WAV payloads standing in for synthesis service
//! responses.

use std::f32::consts::PI;
use std::io::Cursor;

/// A sine tone WAV with `duration_ms` of audio per channel.
pub fn wav_tone(sample_rate: u32, channels: u16, duration_ms: u32) -> Vec<u8> {
    let frames = (sample_rate as u64 * duration_ms as u64 / 1000) as usize;
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
            let t = i as f32 / sample_rate as f32;
            let sample = ((2.0 * PI * 440.0 * t).sin() * 0.5 * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// MPEG-1 Layer III, 32 kbps, 44.1 kHz, mono, no CRC.
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x10, 0xC0];
/// 144 * 32000 / 44100, unpadded
const MP3_FRAME_LEN: usize = 104;

/// An MP3 payload of `frames` silent frames at 44.1 kHz mono.
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(frames * MP3_FRAME_LEN);
    for _ in 0..frames {
        payload.extend_from_slice(&MP3_FRAME_HEADER);
        payload.resize(payload.len() + MP3_FRAME_LEN - MP3_FRAME_HEADER.len(), 0);
    }
    payload
}
