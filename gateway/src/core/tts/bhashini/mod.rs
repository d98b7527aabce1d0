//! Bhashini Text-to-Speech Provider
//!
//! Integration with the Bhashini synthesis service for Indic languages.
//!
//! ## Request
//!
//! `POST {base_url}/synthesize` with a JSON body `{text, language, voiceName}`.
//! The `x-api-key` header is sent only when an API key is configured. A
//! successful response body is a compressed audio payload (MP3); anything else
//! is diagnostic text.
//!
//! ## Output
//!
//! Payloads are decoded, downmixed to mono, resampled to the configured rate
//! and converted to 16-bit PCM. With `chunk_duration_ms` set the audio is
//! delivered as consecutive frames of that duration, otherwise as one frame.
//!
//! ## Usage
//!
//! ```ignore
//! use dialin_gateway::core::tts::{create_tts_provider, TTSConfig};
//!
//! let config = TTSConfig {
//!     provider: "bhashini".to_string(),
//!     language: Some("kn".to_string()),
//!     chunk_duration_ms: Some(20),
//!     ..Default::default()
//! };
//!
//! let mut tts = create_tts_provider("bhashini", config)?;
//! tts.on_audio(callback)?;
//! tts.speak("ನಮಸ್ಕಾರ", true).await?;
//! ```

mod config;
mod provider;


pub use config::{
    BHASHINI_TTS_URL, BhashiniTTSConfig, DEFAULT_LANGUAGE_CODE, DEFAULT_SAMPLE_RATE,
    DEFAULT_VOICE_ID, SUPPORTED_SAMPLE_RATES,
};
pub use provider::{BhashiniTTS, SynthesisRequest};
