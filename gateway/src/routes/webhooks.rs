use axum::{
    Router,
    routing::{delete, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::dialin;
use crate::state::AppState;
use std::sync::Arc;

/// Create the telephony webhook router
///
/// These endpoints are called by Twilio and by the media transport, not by
/// API clients.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(dialin::start_call))
        .route("/dialin/{call_sid}/events", post(dialin::dialin_event))
        .route("/dialin/{call_sid}", delete(dialin::hangup))
        .layer(TraceLayer::new_for_http())
}
