//! Twilio dial-in webhook and per-call transport events
//!
//! `POST /start` is the voice webhook Twilio calls when the phone rings. It
//! provisions a SIP-enabled room and starts a [`DialinSession`] that forwards
//! the call once the room reports it is ready for dial-in. The transport
//! reports its lifecycle through `POST /dialin/{call_sid}/events`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::dialin::{DialinSession, TransportEvent, is_valid_call_sid};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Caller id recorded when Twilio omits `From`
pub const UNKNOWN_CALLER: &str = "unknown-caller";

#[derive(Debug, Clone, Serialize)]
pub struct StartCallResponse {
    pub token: String,
    pub call_sid: String,
    pub sip_endpoint: String,
    pub room_url: String,
}

pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Json<StartCallResponse>> {
    let call_sid = form
        .get("CallSid")
        .filter(|sid| !sid.trim().is_empty())
        .cloned()
        .ok_or_else(|| AppError::BadRequest("Missing CallSid in request".to_string()))?;
    if !is_valid_call_sid(&call_sid) {
        warn!(call_sid = %call_sid, "Rejecting malformed CallSid");
        return Err(AppError::BadRequest("Invalid CallSid in request".to_string()));
    }
    let caller_id = form
        .get("From")
        .filter(|from| !from.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string());

    info!(call_sid = %call_sid, caller_id = %caller_id, "Incoming dial-in call");

    let room = state
        .room_provisioner
        .create_room(&caller_id)
        .await
        .map_err(|e| {
            error!(call_sid = %call_sid, error = %e, "Failed to provision room");
            AppError::Internal(e.to_string())
        })?;

    let session = DialinSession::new(
        call_sid.clone(),
        caller_id,
        room.clone(),
        state.call_forwarder.clone(),
    );
    state.start_session(session);

    Ok(Json(StartCallResponse {
        token: room.token,
        call_sid,
        sip_endpoint: room.sip_endpoint,
        room_url: room.room_url,
    }))
}

pub async fn dialin_event(
    State(state): State<Arc<AppState>>,
    Path(call_sid): Path<String>,
    Json(event): Json<TransportEvent>,
) -> AppResult<StatusCode> {
    let session = state
        .session(&call_sid)
        .ok_or_else(|| AppError::NotFound(format!("No active session for call {call_sid}")))?;

    debug!(call_sid = %call_sid, ?event, "Transport event received");
    session.notify(event).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn hangup(
    State(state): State<Arc<AppState>>,
    Path(call_sid): Path<String>,
) -> AppResult<StatusCode> {
    if state.end_session(&call_sid) {
        info!(call_sid = %call_sid, "Session hung up");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "No active session for call {call_sid}"
        )))
    }
}
