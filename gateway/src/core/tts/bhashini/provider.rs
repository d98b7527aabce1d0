//! Bhashini TTS Provider Implementation
//!
//! Implements the BaseTTS trait for the Bhashini `/synthesize` REST API. The
//! service answers with one compressed payload per utterance, which is
//! normalized into fixed-format PCM frames before delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::core::audio::AudioNormalizer;
use crate::core::tts::base::{
    AudioCallback, BaseTTS, ConnectionState, TTSConfig, TTSError, TTSResult,
};
use crate::core::tts::lifecycle::SynthesisGuard;
use crate::core::tts::metrics::TtsMetrics;

use super::config::{BHASHINI_TTS_URL, BhashiniTTSConfig};

/// One synthesis call; built per utterance and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    /// Service language name, already resolved from the locale code
    pub language: &'static str,
    pub voice_id: String,
    pub sample_rate: u32,
}

/// JSON body of `POST /synthesize`
#[derive(Debug, Serialize)]
struct SynthesizeBody<'a> {
    text: &'a str,
    language: &'a str,
    #[serde(rename = "voiceName")]
    voice_name: &'a str,
}

/// Bhashini Text-to-Speech provider
pub struct BhashiniTTS {
    config: BhashiniTTSConfig,

    /// Client used for requests while connected
    http_client: Option<reqwest::Client>,

    /// Pooled client handed in by the application, reused on every connect
    shared_client: Option<reqwest::Client>,

    audio_callback: Arc<RwLock<Option<Arc<dyn AudioCallback>>>>,

    connection_state: ConnectionState,

    normalizer: AudioNormalizer,

    metrics: Arc<TtsMetrics>,
}

impl BhashiniTTS {
    /// Create a new Bhashini TTS instance
    pub fn create(config: TTSConfig) -> TTSResult<Self> {
        let config = BhashiniTTSConfig::from_base(config).map_err(TTSError::InvalidConfiguration)?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: BhashiniTTSConfig) -> Self {
        Self {
            normalizer: AudioNormalizer::new(config.sample_rate),
            config,
            http_client: None,
            shared_client: None,
            audio_callback: Arc::new(RwLock::new(None)),
            connection_state: ConnectionState::Disconnected,
            metrics: Arc::new(TtsMetrics::new()),
        }
    }

    /// Reuse an existing connection pool instead of building a private client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.shared_client = Some(client);
        self
    }

    pub fn config(&self) -> &BhashiniTTSConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<TtsMetrics> {
        self.metrics.clone()
    }

    /// Build the request for `text` from the configured voice and locale.
    pub fn build_request(&self, text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            language: self.config.language_name(),
            voice_id: self.config.voice_id.clone(),
            sample_rate: self.config.sample_rate,
        }
    }

    fn build_client(config: &BhashiniTTSConfig) -> TTSResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })
    }

    /// Issue the request and wait for the response headers.
    async fn send(&self, request: &SynthesisRequest) -> TTSResult<reqwest::Response> {
        let client = self
            .http_client
            .as_ref()
            .ok_or_else(|| TTSError::ProviderNotReady("Not connected".to_string()))?;

        let body = SynthesizeBody {
            text: &request.text,
            language: request.language,
            voice_name: &request.voice_id,
        };

        debug!(
            text_len = request.text.len(),
            language = request.language,
            voice = %request.voice_id,
            "Bhashini TTS synthesis request"
        );

        let mut builder = client
            .post(self.config.endpoint())
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .json(&body);
        if !self.config.api_key.is_empty() {
            builder = builder.header("x-api-key", &self.config.api_key);
        }

        builder
            .send()
            .await
            .map_err(|e| TTSError::NetworkError(format!("Error generating TTS: {e}")))
    }

    /// Read a response into the compressed payload, or the service's error text.
    async fn read_payload(response: reqwest::Response) -> TTSResult<Bytes> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Bhashini TTS request rejected");
            return Err(TTSError::ProviderError(format!(
                "Bhashini API error: {error_text}"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TTSError::NetworkError(format!("Error generating TTS: {e}")))
    }

    /// Fetch the compressed payload for a request without decoding it.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        let response = self.send(request).await?;
        Self::read_payload(response).await
    }

    /// One request-scoped flow: started, request, decode, frames, stopped.
    #[tracing::instrument(
        name = "bhashini_tts",
        skip(self, request),
        fields(language = request.language, voice = %request.voice_id, chars = request.text.chars().count())
    )]
    async fn run_tts(&self, request: SynthesisRequest) {
        let callback = self.audio_callback.read().clone();
        let mut guard = SynthesisGuard::start(callback, self.metrics.clone()).await;

        guard.start_ttfb();
        let fetched = match self.send(&request).await {
            Ok(response) => {
                guard.stop_ttfb();
                Self::read_payload(response).await
            }
            Err(e) => Err(e),
        };

        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Bhashini TTS synthesis failed");
                self.report_error(&guard, e).await;
                guard.finish().await;
                return;
            }
        };

        guard.metrics().record_usage(&request.text);
        debug!(payload_bytes = payload.len(), "Bhashini TTS payload received");

        match self
            .normalizer
            .normalize_async(payload.to_vec(), self.config.chunking_policy())
            .await
        {
            Ok(frames) => {
                debug!(frames = frames.len(), "Emitting normalized audio frames");
                for frame in frames {
                    guard.metrics().record_frame(frame.data.len());
                    if let Some(callback) = guard.callback() {
                        callback.on_audio(frame).await;
                    }
                }
                guard.metrics().record_success();
            }
            Err(e) => {
                error!(error = %e, "Bhashini TTS audio decode failed");
                let error = TTSError::AudioProcessingFailed(format!("Error processing audio: {e}"));
                self.report_error(&guard, error).await;
            }
        }

        guard.finish().await;
    }

    async fn report_error(&self, guard: &SynthesisGuard, error: TTSError) {
        guard.metrics().record_error(&error);
        if let Some(callback) = guard.callback() {
            callback.on_error(error).await;
        }
    }
}

#[async_trait]
impl BaseTTS for BhashiniTTS {
    fn new(config: TTSConfig) -> TTSResult<Self> {
        BhashiniTTS::create(config)
    }

    async fn connect(&mut self) -> TTSResult<()> {
        self.config
            .validate()
            .map_err(TTSError::InvalidConfiguration)?;
        self.connection_state = ConnectionState::Connecting;

        let client = match self.shared_client.as_ref() {
            Some(client) => client.clone(),
            None => match Self::build_client(&self.config) {
                Ok(client) => client,
                Err(e) => {
                    self.connection_state = ConnectionState::Error(e.to_string());
                    return Err(e);
                }
            },
        };
        self.http_client = Some(client);
        self.connection_state = ConnectionState::Connected;

        info!(
            endpoint = %self.config.endpoint(),
            language = self.config.language_name(),
            sample_rate = self.config.sample_rate,
            "Connected to Bhashini TTS"
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> TTSResult<()> {
        self.http_client = None;
        self.connection_state = ConnectionState::Disconnected;
        info!("Disconnected from Bhashini TTS");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.http_client.is_some() && self.connection_state == ConnectionState::Connected
    }

    fn get_connection_state(&self) -> ConnectionState {
        self.connection_state.clone()
    }

    /// Each call is one complete request, so `flush` changes nothing.
    async fn speak(&mut self, text: &str, _flush: bool) -> TTSResult<()> {
        if !self.is_ready() {
            self.connect().await?;
        }

        let request = self.build_request(text);
        self.run_tts(request).await;
        Ok(())
    }

    fn on_audio(&mut self, callback: Arc<dyn AudioCallback>) -> TTSResult<()> {
        *self.audio_callback.write() = Some(callback);
        Ok(())
    }

    fn remove_audio_callback(&mut self) -> TTSResult<()> {
        *self.audio_callback.write() = None;
        Ok(())
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "bhashini",
            "name": "Bhashini TTS",
            "api_type": "HTTP REST",
            "default_endpoint": format!("{BHASHINI_TTS_URL}/synthesize"),
            "endpoint": self.config.endpoint(),
            "language": self.config.language_name(),
            "voice_id": self.config.voice_id,
            "output": {
                "format": "pcm16",
                "sample_rate": self.config.sample_rate,
                "channels": 1,
                "chunk_duration_ms": self.config.chunk_duration_ms,
            },
            "metrics": self.metrics.snapshot(),
        })
    }
}
