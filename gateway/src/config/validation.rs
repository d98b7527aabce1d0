use url::Url;

use super::ServerConfig;
use crate::core::tts::bhashini::SUPPORTED_SAMPLE_RATES;

/// Validate a merged configuration.
pub(super) fn validate(config: &ServerConfig) -> Result<(), String> {
    validate_sample_rate(config.tts_sample_rate)?;
    validate_chunk_ms(config.tts_chunk_ms)?;

    if config.tts_request_timeout_secs == 0 {
        return Err("TTS_REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
    }

    validate_url("BHASHINI_BASE_URL", &config.bhashini_base_url)?;
    validate_url("DAILY_API_URL", &config.daily_api_url)?;
    validate_url("TWILIO_API_URL", &config.twilio_api_url)?;

    Ok(())
}

fn validate_sample_rate(rate: u32) -> Result<(), String> {
    if SUPPORTED_SAMPLE_RATES.contains(&rate) {
        Ok(())
    } else {
        Err(format!(
            "Unsupported TTS sample rate {rate}. Supported rates: {SUPPORTED_SAMPLE_RATES:?}"
        ))
    }
}

fn validate_chunk_ms(chunk_ms: Option<u32>) -> Result<(), String> {
    match chunk_ms {
        Some(0) => Err("TTS_CHUNK_MS must be greater than zero".to_string()),
        _ => Ok(()),
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("Invalid {name} '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("{name} must use http or https, got '{scheme}'")),
    }
}
