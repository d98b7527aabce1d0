use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::audio::OUTPUT_CHANNELS;
use crate::core::tts::{AudioCallback, AudioData, BaseTTS, BhashiniTTS, TTSError};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /speak`
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    /// Locale code; the configured default is used when absent
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// Collects every frame and the first error of one synthesis.
#[derive(Default)]
struct CollectingCallback {
    frames: Mutex<Vec<AudioData>>,
    error: Mutex<Option<TTSError>>,
}

impl AudioCallback for CollectingCallback {
    fn on_audio(&self, audio_data: AudioData) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.frames.lock().push(audio_data);
        })
    }

    fn on_error(&self, error: TTSError) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.error.lock().get_or_insert(error);
        })
    }

    fn on_complete(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeakRequest>,
) -> AppResult<Response> {
    let mut tts_config = state.config.tts_config();
    if let Some(language) = request.language.filter(|l| !l.trim().is_empty()) {
        tts_config.language = Some(language);
    }
    if let Some(voice_id) = request.voice_id.filter(|v| !v.trim().is_empty()) {
        tts_config.voice_id = Some(voice_id);
    }

    let mut tts = BhashiniTTS::create(tts_config)?.with_http_client(state.http_client.clone());
    let collector = Arc::new(CollectingCallback::default());
    tts.on_audio(collector.clone())?;

    debug!(text_len = request.text.len(), "Speak request");
    tts.speak(&request.text, true).await?;
    tts.disconnect().await?;

    if let Some(error) = collector.error.lock().take() {
        return Err(AppError::from(error));
    }

    let frames = std::mem::take(&mut *collector.frames.lock());
    if frames.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let frame_count = frames.len();
    let sample_rate = frames[0].sample_rate;
    let mut audio = Vec::with_capacity(frames.iter().map(|f| f.data.len()).sum());
    for frame in frames {
        audio.extend_from_slice(&frame.data);
    }

    info!(
        frames = frame_count,
        bytes = audio.len(),
        sample_rate,
        "Speak request synthesized"
    );

    let mut response = (StatusCode::OK, audio).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/pcm"));
    headers.insert("x-sample-rate", HeaderValue::from(sample_rate));
    headers.insert("x-channels", HeaderValue::from(OUTPUT_CHANNELS));
    headers.insert("x-frame-count", HeaderValue::from(frame_count));
    Ok(response)
}
