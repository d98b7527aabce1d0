//! Bhashini TTS Configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::audio::ChunkingPolicy;
use crate::core::tts::base::TTSConfig;
use crate::core::tts::language::resolve_language;

/// Default Bhashini REST endpoint
pub const BHASHINI_TTS_URL: &str = "https://tts.bhashini.ai/v1";

pub const DEFAULT_VOICE_ID: &str = "Female1";
pub const DEFAULT_LANGUAGE_CODE: &str = "kn";
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Output rates the normalizer is configured for
pub const SUPPORTED_SAMPLE_RATES: [u32; 6] = [8000, 16000, 22050, 24000, 44100, 48000];

/// Bhashini TTS provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhashiniTTSConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Locale code (e.g. `kn`, `hi-IN`)
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Output sample rate in Hz; every frame uses this rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Chunked mode when set
    #[serde(default)]
    pub chunk_duration_ms: Option<u32>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    BHASHINI_TTS_URL.to_string()
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_language_code() -> String {
    DEFAULT_LANGUAGE_CODE.to_string()
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BhashiniTTSConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            voice_id: default_voice_id(),
            language_code: default_language_code(),
            sample_rate: default_sample_rate(),
            chunk_duration_ms: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BhashiniTTSConfig {
    /// Create BhashiniTTSConfig from base TTSConfig
    pub fn from_base(base: TTSConfig) -> Result<Self, String> {
        let defaults = Self::default();
        let config = Self {
            api_key: base.api_key,
            base_url: base
                .base_url
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.base_url),
            voice_id: base.voice_id.unwrap_or(defaults.voice_id),
            language_code: base.language.unwrap_or(defaults.language_code),
            sample_rate: base.sample_rate.unwrap_or(defaults.sample_rate),
            chunk_duration_ms: base.chunk_duration_ms,
            request_timeout_secs: base
                .request_timeout
                .unwrap_or(defaults.request_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(format!(
                "Unsupported sample rate {}. Supported rates: {:?}",
                self.sample_rate, SUPPORTED_SAMPLE_RATES
            ));
        }

        if self.chunk_duration_ms == Some(0) {
            return Err("Chunk duration must be greater than zero".to_string());
        }

        Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid Bhashini base URL '{}': {}", self.base_url, e))?;

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Synthesis endpoint: `{base_url}/synthesize`
    pub fn endpoint(&self) -> String {
        format!("{}/synthesize", self.base_url.trim_end_matches('/'))
    }

    /// Language name sent to the service
    pub fn language_name(&self) -> &'static str {
        resolve_language(&self.language_code)
    }

    pub fn chunking_policy(&self) -> Option<ChunkingPolicy> {
        self.chunk_duration_ms
            .and_then(|ms| ChunkingPolicy::new(ms).ok())
    }
}
