//! Configuration module for the dial-in gateway
//!
//! Configuration comes from environment variables (a `.env` file is loaded into
//! the environment by `main`) and, optionally, a YAML file.
//! Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `env`: Environment variable loading and defaults
//! - `yaml`: YAML configuration file loading and overrides
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use dialin_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

mod env;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::tts::TTSConfig;

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, CORS)
/// - Bhashini synthesis settings
/// - Daily room provisioning credentials
/// - Twilio call forwarding credentials
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Synthesis settings
    pub bhashini_api_key: Option<String>,
    pub bhashini_base_url: String,
    pub tts_voice_id: String,
    /// Locale code, e.g. "kn" or "hi-IN"
    pub tts_language: String,
    pub tts_sample_rate: u32,
    /// Chunked delivery when set
    pub tts_chunk_ms: Option<u32>,
    pub tts_request_timeout_secs: u64,

    // Daily settings
    pub daily_api_key: Option<String>,
    pub daily_api_url: String,
    pub daily_room_expiry_secs: u64,

    // Twilio settings
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_api_url: String,

    /// Display name the bot joins rooms with
    pub bot_name: String,
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.bhashini_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.daily_api_key {
            key.zeroize();
        }
        if let Some(ref mut token) = self.twilio_auth_token {
            token.zeroize();
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(secret: &Option<String>) -> &'static str {
            if secret.is_some() { "<redacted>" } else { "<unset>" }
        }

        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("bhashini_api_key", &redacted(&self.bhashini_api_key))
            .field("bhashini_base_url", &self.bhashini_base_url)
            .field("tts_voice_id", &self.tts_voice_id)
            .field("tts_language", &self.tts_language)
            .field("tts_sample_rate", &self.tts_sample_rate)
            .field("tts_chunk_ms", &self.tts_chunk_ms)
            .field("tts_request_timeout_secs", &self.tts_request_timeout_secs)
            .field("daily_api_key", &redacted(&self.daily_api_key))
            .field("daily_api_url", &self.daily_api_url)
            .field("daily_room_expiry_secs", &self.daily_room_expiry_secs)
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_auth_token", &redacted(&self.twilio_auth_token))
            .field("twilio_api_url", &self.twilio_api_url)
            .field("bot_name", &self.bot_name)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = env::load_from_env()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (with defaults) form the base and YAML values
    /// override them. The merged result is validated.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = env::load_from_env()?;
        yaml_config.apply(&mut config);

        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Synthesis settings in the provider-agnostic form.
    pub fn tts_config(&self) -> TTSConfig {
        TTSConfig {
            provider: "bhashini".to_string(),
            api_key: self.bhashini_api_key.clone().unwrap_or_default(),
            base_url: Some(self.bhashini_base_url.clone()),
            voice_id: Some(self.tts_voice_id.clone()),
            language: Some(self.tts_language.clone()),
            sample_rate: Some(self.tts_sample_rate),
            chunk_duration_ms: self.tts_chunk_ms,
            request_timeout: Some(self.tts_request_timeout_secs),
        }
    }

    pub fn daily_room_expiry(&self) -> Duration {
        Duration::from_secs(self.daily_room_expiry_secs)
    }

    /// Whether Daily credentials are configured
    pub fn has_daily(&self) -> bool {
        self.daily_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Whether Twilio credentials are configured
    pub fn has_twilio(&self) -> bool {
        self.twilio_account_sid
            .as_deref()
            .is_some_and(|s| !s.is_empty())
            && self
                .twilio_auth_token
                .as_deref()
                .is_some_and(|t| !t.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        env::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            for key in [
                "HOST",
                "PORT",
                "CORS_ALLOWED_ORIGINS",
                "BHASHINI_API_KEY",
                "BHASHINI_BASE_URL",
                "TTS_VOICE_ID",
                "TTS_LANGUAGE",
                "TTS_SAMPLE_RATE",
                "TTS_CHUNK_MS",
                "TTS_REQUEST_TIMEOUT_SECS",
                "DAILY_API_KEY",
                "DAILY_API_URL",
                "DAILY_ROOM_EXPIRY_SECS",
                "TWILIO_ACCOUNT_SID",
                "TWILIO_AUTH_TOKEN",
                "TWILIO_API_URL",
                "BOT_NAME",
            ] {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7860);
        assert_eq!(config.bhashini_base_url, "https://tts.bhashini.ai/v1");
        assert_eq!(config.tts_voice_id, "Female1");
        assert_eq!(config.tts_language, "kn");
        assert_eq!(config.tts_sample_rate, 16000);
        assert_eq!(config.tts_chunk_ms, None);
        assert_eq!(config.tts_request_timeout_secs, 30);
        assert_eq!(config.daily_api_url, "https://api.daily.co/v1");
        assert_eq!(config.daily_room_expiry_secs, 3600);
        assert_eq!(config.twilio_api_url, "https://api.twilio.com/2010-04-01");
        assert_eq!(config.bot_name, "Phone Bot");
        assert!(!config.has_daily());
        assert!(!config.has_twilio());
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "8080");
            env::set_var("BHASHINI_API_KEY", "bh-key");
            env::set_var("TTS_LANGUAGE", "hi");
            env::set_var("TTS_SAMPLE_RATE", "8000");
            env::set_var("TTS_CHUNK_MS", "20");
            env::set_var("DAILY_API_KEY", "daily");
            env::set_var("TWILIO_ACCOUNT_SID", "AC1");
            env::set_var("TWILIO_AUTH_TOKEN", "tw");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bhashini_api_key, Some("bh-key".to_string()));
        assert_eq!(config.tts_sample_rate, 8000);
        assert_eq!(config.tts_chunk_ms, Some(20));
        assert!(config.has_daily());
        assert!(config.has_twilio());

        let tts = config.tts_config();
        assert_eq!(tts.language.as_deref(), Some("hi"));
        assert_eq!(tts.api_key, "bh-key");
        assert_eq!(tts.chunk_duration_ms, Some(20));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.unwrap_err().to_string().contains("PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unsupported_sample_rate() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_SAMPLE_RATE", "11025");
        }

        let result = ServerConfig::from_env();
        assert!(result.unwrap_err().to_string().contains("sample rate"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_chunk() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_CHUNK_MS", "0");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 9000

tts:
  api_key: "yaml-key"
  language: "ta"
  chunk_ms: 40
"#;
        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("HOST", "0.0.0.0");
            env::set_var("BHASHINI_API_KEY", "env-key");
            env::set_var("TTS_VOICE_ID", "Male1");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.bhashini_api_key, Some("yaml-key".to_string()));
        assert_eq!(config.tts_language, "ta");
        assert_eq!(config.tts_chunk_ms, Some(40));
        // ENV value survives where YAML is silent
        assert_eq!(config.tts_voice_id, "Male1");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_yaml() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");
        fs::write(&config_path, "invalid: yaml: [content").unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_base_url() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "tts:\n  base_url: \"::not a url::\"\n").unwrap();

        assert!(ServerConfig::from_file(&config_path).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = ServerConfig::default();
        config.bhashini_api_key = Some("bh-secret".to_string());
        config.twilio_auth_token = Some("tw-secret".to_string());

        let debug = format!("{config:?}");
        assert!(!debug.contains("bh-secret"));
        assert!(!debug.contains("tw-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_address() {
        let mut config = ServerConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3001;
        assert_eq!(config.address(), "127.0.0.1:3001");
    }
}
