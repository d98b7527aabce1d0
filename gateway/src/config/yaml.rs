use serde::Deserialize;
use std::path::PathBuf;

use super::ServerConfig;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; anything left out
/// keeps its environment or default value.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 7860
///   cors_allowed_origins: "*"
///
/// tts:
///   api_key: "your-bhashini-key"
///   base_url: "https://tts.bhashini.ai/v1"
///   voice_id: "Female1"
///   language: "kn"
///   sample_rate: 16000
///   chunk_ms: 20
///   request_timeout_secs: 30
///
/// daily:
///   api_key: "your-daily-key"
///   api_url: "https://api.daily.co/v1"
///   room_expiry_secs: 3600
///
/// twilio:
///   account_sid: "ACxxxxxxxx"
///   auth_token: "your-auth-token"
///
/// bot:
///   name: "Phone Bot"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub tts: Option<TtsYaml>,
    pub daily: Option<DailyYaml>,
    pub twilio: Option<TwilioYaml>,
    pub bot: Option<BotYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_allowed_origins: Option<String>,
}

/// Bhashini synthesis settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
    pub sample_rate: Option<u32>,
    pub chunk_ms: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DailyYaml {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub room_expiry_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TwilioYaml {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BotYaml {
    pub name: Option<String>,
}

impl YamlConfig {
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }

    /// Override `config` with every value present in the YAML.
    pub fn apply(self, config: &mut ServerConfig) {
        if let Some(server) = self.server {
            set(&mut config.host, server.host);
            set(&mut config.port, server.port);
            set_opt(&mut config.cors_allowed_origins, server.cors_allowed_origins);
        }

        if let Some(tts) = self.tts {
            set_opt(&mut config.bhashini_api_key, tts.api_key);
            set(&mut config.bhashini_base_url, tts.base_url);
            set(&mut config.tts_voice_id, tts.voice_id);
            set(&mut config.tts_language, tts.language);
            set(&mut config.tts_sample_rate, tts.sample_rate);
            set_opt(&mut config.tts_chunk_ms, tts.chunk_ms);
            set(&mut config.tts_request_timeout_secs, tts.request_timeout_secs);
        }

        if let Some(daily) = self.daily {
            set_opt(&mut config.daily_api_key, daily.api_key);
            set(&mut config.daily_api_url, daily.api_url);
            set(&mut config.daily_room_expiry_secs, daily.room_expiry_secs);
        }

        if let Some(twilio) = self.twilio {
            set_opt(&mut config.twilio_account_sid, twilio.account_sid);
            set_opt(&mut config.twilio_auth_token, twilio.auth_token);
            set(&mut config.twilio_api_url, twilio.api_url);
        }

        if let Some(bot) = self.bot {
            set(&mut config.bot_name, bot.name);
        }
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  cors_allowed_origins: "https://a.example.com,https://b.example.com"

tts:
  api_key: "bh"
  base_url: "http://localhost:9000/v1"
  voice_id: "Male1"
  language: "te"
  sample_rate: 24000
  chunk_ms: 100
  request_timeout_secs: 10

daily:
  api_key: "daily"
  room_expiry_secs: 600

twilio:
  account_sid: "AC1"
  auth_token: "tok"
  api_url: "http://localhost:9001"

bot:
  name: "Helpline Bot"
"#;
        let yaml_config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let mut config = ServerConfig::default();
        yaml_config.apply(&mut config);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_allowed_origins.as_deref(),
            Some("https://a.example.com,https://b.example.com")
        );
        assert_eq!(config.bhashini_api_key.as_deref(), Some("bh"));
        assert_eq!(config.bhashini_base_url, "http://localhost:9000/v1");
        assert_eq!(config.tts_voice_id, "Male1");
        assert_eq!(config.tts_language, "te");
        assert_eq!(config.tts_sample_rate, 24000);
        assert_eq!(config.tts_chunk_ms, Some(100));
        assert_eq!(config.tts_request_timeout_secs, 10);
        assert_eq!(config.daily_api_key.as_deref(), Some("daily"));
        assert_eq!(config.daily_room_expiry_secs, 600);
        assert_eq!(config.twilio_account_sid.as_deref(), Some("AC1"));
        assert_eq!(config.twilio_api_url, "http://localhost:9001");
        assert_eq!(config.bot_name, "Helpline Bot");
    }

    #[test]
    fn test_partial_yaml_keeps_other_values() {
        let yaml_config: YamlConfig = serde_yaml::from_str("server:\n  port: 9999\n").unwrap();
        let mut config = ServerConfig::default();
        config.tts_language = "hi".to_string();
        yaml_config.apply(&mut config);

        assert_eq!(config.port, 9999);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.tts_language, "hi");
    }

    #[test]
    fn test_empty_yaml() {
        let yaml_config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(yaml_config.server.is_none());
        assert!(yaml_config.tts.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "bot:\n  name: \"Raj\"\n").unwrap();

        let yaml_config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(yaml_config.bot.unwrap().name.as_deref(), Some("Raj"));
    }
}
