//! Inbound call bridging.
//!
//! An inbound call gets a media room with a SIP dial-in endpoint
//! ([`RoomProvisioner`]), a [`DialinSession`] that reacts to transport events,
//! and exactly one signaling update moving the phone leg into the room
//! ([`CallForwarder`], guarded by [`CallForwardLatch`]).

pub mod forwarder;
pub mod room;
pub mod session;

pub use forwarder::{
    CallForwarder, TWILIO_API_URL, TwilioCallForwarder, dial_sip_twiml, is_valid_call_sid,
};
pub use room::{DAILY_API_URL, DailyRoomProvisioner, RoomDetails, RoomProvisioner};
pub use session::{
    CallForwardLatch, DialinSession, ForwardOutcome, Participant, SessionHandle, TransportEvent,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("Failed to create room: {0}")]
    RoomCreation(String),

    #[error("Failed to create meeting token: {0}")]
    TokenCreation(String),

    #[error("No SIP endpoint provided for room")]
    MissingSipEndpoint,

    #[error("Failed to forward call: {0}")]
    Forwarding(String),

    #[error("Session for call {0} is closed")]
    SessionClosed(String),

    #[error("Invalid telephony configuration: {0}")]
    InvalidConfiguration(String),
}

pub type TelephonyResult<T> = Result<T, TelephonyError>;
