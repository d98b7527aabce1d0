use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized audio frame handed to the downstream sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    /// Linear PCM, signed 16-bit little-endian
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub format: String,
    pub duration_ms: Option<u32>,
}

/// Receives the lifecycle of every synthesis request.
///
/// For each request a provider calls `on_started` once, then either
/// `on_audio` zero or more times or `on_error` once, and finally
/// `on_complete` exactly once.
pub trait AudioCallback: Send + Sync {
    fn on_started(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }

    fn on_audio(&self, audio_data: AudioData) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    fn on_error(&self, error: TTSError) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    fn on_complete(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

/// Which side of the pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TTSErrorKind {
    /// The remote synthesis service failed or could not be reached
    SynthesisService,
    /// The payload arrived but could not be turned into PCM
    AudioDecode,
    Configuration,
}

#[derive(Debug, Clone, Error)]
pub enum TTSError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Provider not ready: {0}")]
    ProviderNotReady(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Audio processing failed: {0}")]
    AudioProcessingFailed(String),
}

impl TTSError {
    pub fn kind(&self) -> TTSErrorKind {
        match self {
            TTSError::NetworkError(_) | TTSError::ProviderError(_) => {
                TTSErrorKind::SynthesisService
            }
            TTSError::AudioProcessingFailed(_) => TTSErrorKind::AudioDecode,
            TTSError::InvalidConfiguration(_) | TTSError::ProviderNotReady(_) => {
                TTSErrorKind::Configuration
            }
        }
    }
}

pub type TTSResult<T> = Result<T, TTSError>;

/// Provider-agnostic synthesis settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TTSConfig {
    pub provider: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub voice_id: Option<String>,
    /// Locale code, resolved to a service language name by the provider
    pub language: Option<String>,
    pub sample_rate: Option<u32>,
    /// Re-chunk decoded audio into frames of this many milliseconds
    pub chunk_duration_ms: Option<u32>,
    /// Request timeout in seconds
    pub request_timeout: Option<u64>,
}

#[async_trait]
pub trait BaseTTS: Send + Sync {
    fn new(config: TTSConfig) -> TTSResult<Self>
    where
        Self: Sized;

    async fn connect(&mut self) -> TTSResult<()>;

    async fn disconnect(&mut self) -> TTSResult<()>;

    fn is_ready(&self) -> bool;

    fn get_connection_state(&self) -> ConnectionState;

    /// Synthesize `text` and deliver its frames through the registered callback.
    ///
    /// Service and decode failures are reported through
    /// [`AudioCallback::on_error`] rather than returned.
    async fn speak(&mut self, text: &str, flush: bool) -> TTSResult<()>;

    fn on_audio(&mut self, callback: Arc<dyn AudioCallback>) -> TTSResult<()>;

    fn remove_audio_callback(&mut self) -> TTSResult<()>;

    fn get_provider_info(&self) -> serde_json::Value;
}

pub type BoxedTTS = Box<dyn BaseTTS>;
