use std::env;
use std::str::FromStr;

use super::ServerConfig;
use crate::core::dialin::{DAILY_API_URL, TWILIO_API_URL};
use crate::core::tts::bhashini::{
    BHASHINI_TTS_URL, DEFAULT_LANGUAGE_CODE, DEFAULT_SAMPLE_RATE, DEFAULT_VOICE_ID,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 7860;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ROOM_EXPIRY_SECS: u64 = 3600;
const DEFAULT_BOT_NAME: &str = "Phone Bot";

pub(super) fn defaults() -> ServerConfig {
    ServerConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
        cors_allowed_origins: None,
        bhashini_api_key: None,
        bhashini_base_url: BHASHINI_TTS_URL.to_string(),
        tts_voice_id: DEFAULT_VOICE_ID.to_string(),
        tts_language: DEFAULT_LANGUAGE_CODE.to_string(),
        tts_sample_rate: DEFAULT_SAMPLE_RATE,
        tts_chunk_ms: None,
        tts_request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        daily_api_key: None,
        daily_api_url: DAILY_API_URL.to_string(),
        daily_room_expiry_secs: DEFAULT_ROOM_EXPIRY_SECS,
        twilio_account_sid: None,
        twilio_auth_token: None,
        twilio_api_url: TWILIO_API_URL.to_string(),
        bot_name: DEFAULT_BOT_NAME.to_string(),
    }
}

/// Non-empty value of an environment variable
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("Invalid value for {key} ('{raw}'): {e}")),
        None => Ok(None),
    }
}

pub(super) fn load_from_env() -> Result<ServerConfig, String> {
    let mut config = defaults();

    if let Some(host) = var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_var("PORT")? {
        config.port = port;
    }
    config.cors_allowed_origins = var("CORS_ALLOWED_ORIGINS");

    config.bhashini_api_key = var("BHASHINI_API_KEY");
    if let Some(url) = var("BHASHINI_BASE_URL") {
        config.bhashini_base_url = url;
    }
    if let Some(voice) = var("TTS_VOICE_ID") {
        config.tts_voice_id = voice;
    }
    if let Some(language) = var("TTS_LANGUAGE") {
        config.tts_language = language;
    }
    if let Some(rate) = parse_var("TTS_SAMPLE_RATE")? {
        config.tts_sample_rate = rate;
    }
    config.tts_chunk_ms = parse_var("TTS_CHUNK_MS")?;
    if let Some(timeout) = parse_var("TTS_REQUEST_TIMEOUT_SECS")? {
        config.tts_request_timeout_secs = timeout;
    }

    config.daily_api_key = var("DAILY_API_KEY");
    if let Some(url) = var("DAILY_API_URL") {
        config.daily_api_url = url;
    }
    if let Some(expiry) = parse_var("DAILY_ROOM_EXPIRY_SECS")? {
        config.daily_room_expiry_secs = expiry;
    }

    config.twilio_account_sid = var("TWILIO_ACCOUNT_SID");
    config.twilio_auth_token = var("TWILIO_AUTH_TOKEN");
    if let Some(url) = var("TWILIO_API_URL") {
        config.twilio_api_url = url;
    }

    if let Some(name) = var("BOT_NAME") {
        config.bot_name = name;
    }

    Ok(config)
}
