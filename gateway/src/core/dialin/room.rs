//! Media room provisioning with SIP dial-in.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{TelephonyError, TelephonyResult};

/// Default Daily REST endpoint
pub const DAILY_API_URL: &str = "https://api.daily.co/v1";

/// What a session needs to join the room and route the call into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDetails {
    pub room_url: String,
    pub token: String,
    pub sip_endpoint: String,
}

#[async_trait]
pub trait RoomProvisioner: Send + Sync {
    /// Create a room that accepts one SIP dial-in from `caller_id`.
    async fn create_room(&self, caller_id: &str) -> TelephonyResult<RoomDetails>;
}

/// Daily rooms over the REST API
pub struct DailyRoomProvisioner {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    room_expiry: Duration,
    bot_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateRoomBody<'a> {
    properties: RoomProperties<'a>,
}

#[derive(Debug, Serialize)]
struct RoomProperties<'a> {
    exp: u64,
    sip: SipProperties<'a>,
}

#[derive(Debug, Serialize)]
struct SipProperties<'a> {
    display_name: &'a str,
    video: bool,
    sip_mode: &'static str,
    num_endpoints: u32,
}

#[derive(Debug, Deserialize)]
struct RoomResponse {
    name: String,
    url: String,
    #[serde(default)]
    config: Option<RoomConfig>,
}

#[derive(Debug, Deserialize)]
struct RoomConfig {
    #[serde(default)]
    sip_uri: Option<SipUri>,
}

#[derive(Debug, Deserialize)]
struct SipUri {
    #[serde(default)]
    endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
struct MeetingTokenBody<'a> {
    properties: MeetingTokenProperties<'a>,
}

#[derive(Debug, Serialize)]
struct MeetingTokenProperties<'a> {
    room_name: &'a str,
    is_owner: bool,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MeetingTokenResponse {
    token: String,
}

impl DailyRoomProvisioner {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        room_expiry: Duration,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            room_expiry,
            bot_name: None,
        }
    }

    /// Display name the bot joins under when it uses the owner token.
    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    fn expiry_timestamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (now + self.room_expiry).as_secs()
    }

    async fn create_sip_room(&self, caller_id: &str, exp: u64) -> TelephonyResult<RoomResponse> {
        let body = CreateRoomBody {
            properties: RoomProperties {
                exp,
                sip: SipProperties {
                    display_name: caller_id,
                    video: false,
                    sip_mode: "dial-in",
                    num_endpoints: 1,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/rooms", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelephonyError::RoomCreation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelephonyError::RoomCreation(format!(
                "Daily API error {status}: {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TelephonyError::RoomCreation(format!("Failed to parse response: {e}")))
    }

    async fn create_owner_token(&self, room_name: &str, exp: u64) -> TelephonyResult<String> {
        let body = MeetingTokenBody {
            properties: MeetingTokenProperties {
                room_name,
                is_owner: true,
                exp,
                user_name: self.bot_name.as_deref(),
            },
        };

        let response = self
            .client
            .post(format!("{}/meeting-tokens", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelephonyError::TokenCreation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelephonyError::TokenCreation(format!(
                "Daily API error {status}: {error_text}"
            )));
        }

        let token: MeetingTokenResponse = response
            .json()
            .await
            .map_err(|e| TelephonyError::TokenCreation(format!("Failed to parse response: {e}")))?;
        Ok(token.token)
    }
}

#[async_trait]
impl RoomProvisioner for DailyRoomProvisioner {
    async fn create_room(&self, caller_id: &str) -> TelephonyResult<RoomDetails> {
        let exp = self.expiry_timestamp();
        let room = self.create_sip_room(caller_id, exp).await?;

        let sip_endpoint = room
            .config
            .and_then(|c| c.sip_uri)
            .and_then(|s| s.endpoint)
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or(TelephonyError::MissingSipEndpoint)?;
        debug!(room = %room.name, %sip_endpoint, "Daily room created");

        let token = self.create_owner_token(&room.name, exp).await?;

        info!(room_url = %room.url, caller_id, "Provisioned SIP dial-in room");
        Ok(RoomDetails {
            room_url: room.url,
            token,
            sip_endpoint,
        })
    }
}
