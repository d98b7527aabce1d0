mod base;
pub mod bhashini;
pub mod language;
pub mod lifecycle;
pub mod metrics;

pub use base::{
    AudioCallback, AudioData, BaseTTS, BoxedTTS, ConnectionState, TTSConfig, TTSError,
    TTSErrorKind, TTSResult,
};
pub use bhashini::{BHASHINI_TTS_URL, BhashiniTTS, BhashiniTTSConfig, SynthesisRequest};
pub use language::{DEFAULT_LANGUAGE, resolve_language};
pub use lifecycle::SynthesisGuard;
pub use metrics::{TtsMetrics, TtsMetricsSnapshot};
use std::collections::HashMap;

/// Factory function to create a TTS provider.
///
/// # Supported Providers
///
/// - `"bhashini"` - Bhashini Indic TTS API
///
/// # Example
///
/// ```rust,ignore
/// use dialin_gateway::core::tts::{create_tts_provider, TTSConfig};
///
/// let config = TTSConfig {
///     language: Some("kn".to_string()),
///     voice_id: Some("Female1".to_string()),
///     ..Default::default()
/// };
///
/// let provider = create_tts_provider("bhashini", config)?;
/// ```
pub fn create_tts_provider(provider_type: &str, config: TTSConfig) -> TTSResult<Box<dyn BaseTTS>> {
    match provider_type.to_lowercase().as_str() {
        "bhashini" => Ok(Box::new(BhashiniTTS::new(config)?)),
        _ => Err(TTSError::InvalidConfiguration(format!(
            "Unsupported TTS provider: {provider_type}. Supported providers: bhashini"
        ))),
    }
}

/// Returns a map of provider names to their default API endpoint URLs.
pub fn get_tts_provider_urls() -> HashMap<String, String> {
    let mut urls = HashMap::new();
    urls.insert("bhashini".to_string(), BHASHINI_TTS_URL.to_string());
    urls
}
