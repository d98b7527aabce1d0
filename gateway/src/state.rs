use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::core::dialin::{
    CallForwarder, DailyRoomProvisioner, DialinSession, RoomProvisioner, SessionHandle,
    TwilioCallForwarder,
};

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// Connection pool shared by every outbound HTTP client
    pub http_client: reqwest::Client,
    pub room_provisioner: Arc<dyn RoomProvisioner>,
    pub call_forwarder: Arc<dyn CallForwarder>,
    /// Running dial-in sessions keyed by call sid
    pub sessions: DashMap<String, SessionHandle>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tts_request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build tuned HTTP client, using defaults");
                reqwest::Client::new()
            });

        if !config.has_daily() {
            warn!("DAILY_API_KEY not set, room provisioning will fail");
        }
        if !config.has_twilio() {
            warn!("Twilio credentials not set, call forwarding will fail");
        }

        let room_provisioner = Arc::new(DailyRoomProvisioner::new(
            http_client.clone(),
            config.daily_api_url.clone(),
            config.daily_api_key.clone().unwrap_or_default(),
            config.daily_room_expiry(),
        )
        .with_bot_name(config.bot_name.clone()));
        let call_forwarder = Arc::new(TwilioCallForwarder::new(
            http_client.clone(),
            config.twilio_api_url.clone(),
            config.twilio_account_sid.clone().unwrap_or_default(),
            config.twilio_auth_token.clone().unwrap_or_default(),
        ));

        Self::with_collaborators(config, http_client, room_provisioner, call_forwarder)
    }

    /// Build state around explicit provisioning and forwarding clients.
    pub fn with_collaborators(
        config: ServerConfig,
        http_client: reqwest::Client,
        room_provisioner: Arc<dyn RoomProvisioner>,
        call_forwarder: Arc<dyn CallForwarder>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            http_client,
            room_provisioner,
            call_forwarder,
            sessions: DashMap::new(),
        })
    }

    /// Register and spawn a session; it is removed again when its loop ends.
    pub fn start_session(self: &Arc<Self>, session: DialinSession) -> SessionHandle {
        let call_sid = session.call_id().to_string();
        let (handle, task) = session.spawn();

        if let Some(previous) = self.sessions.insert(call_sid.clone(), handle.clone()) {
            warn!(call_sid = %call_sid, "Replacing existing session for call");
            previous.hangup();
        }

        let state = Arc::clone(self);
        let room_url = handle.room().room_url.clone();
        tokio::spawn(async move {
            if let Err(e) = task.await {
                error!(call_sid = %call_sid, error = %e, "Dial-in session task failed");
            }
            state
                .sessions
                .remove_if(&call_sid, |_, h| h.room().room_url == room_url);
            info!(call_sid = %call_sid, active = state.sessions.len(), "Session removed");
        });

        handle
    }

    pub fn session(&self, call_sid: &str) -> Option<SessionHandle> {
        self.sessions.get(call_sid).map(|entry| entry.value().clone())
    }

    /// Cancel a session. Returns false when no session exists for the call.
    pub fn end_session(&self, call_sid: &str) -> bool {
        match self.sessions.get(call_sid) {
            Some(entry) => {
                entry.value().hangup();
                true
            }
            None => false,
        }
    }
}
