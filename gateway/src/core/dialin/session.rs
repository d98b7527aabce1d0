//! Per-call dial-in session.
//!
//! A session owns everything tied to one inbound call: the provisioned room,
//! the forwarding latch, a cancellation token and optionally the synthesizer
//! that speaks into the call. Transport events and upstream text arrive over
//! mpsc channels and are handled one at a time.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::forwarder::CallForwarder;
use super::room::RoomDetails;
use super::{TelephonyError, TelephonyResult};
use crate::core::tts::{BaseTTS, BoxedTTS};

const EVENT_CHANNEL_CAPACITY: usize = 32;
const UTTERANCE_CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    pub id: String,
}

/// Notifications from the media transport about a call's room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TransportEvent {
    FirstParticipantJoined {
        participant: Participant,
    },
    ParticipantLeft {
        participant: Participant,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Raised once per provisioned SIP endpoint
    DialinReady {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    DialinConnected {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    DialinStopped {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    DialinError {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    DialinWarning {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Forwarded,
    AlreadyForwarded,
}

/// One-shot guard around the call forwarding update.
///
/// The lock is held across the forwarding request, so concurrent ready
/// notifications cannot both forward. A failed attempt leaves the latch open.
#[derive(Debug, Default)]
pub struct CallForwardLatch {
    forwarded: Mutex<bool>,
}

impl CallForwardLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_forwarded(&self) -> bool {
        *self.forwarded.lock().await
    }

    pub async fn forward_once(
        &self,
        forwarder: &dyn CallForwarder,
        call_id: &str,
        sip_uri: &str,
    ) -> TelephonyResult<ForwardOutcome> {
        let mut forwarded = self.forwarded.lock().await;
        if *forwarded {
            return Ok(ForwardOutcome::AlreadyForwarded);
        }

        forwarder.forward_call(call_id, sip_uri).await?;
        *forwarded = true;
        Ok(ForwardOutcome::Forwarded)
    }
}

pub struct DialinSession {
    call_id: String,
    caller_id: String,
    room: RoomDetails,
    forwarder: Arc<dyn CallForwarder>,
    latch: CallForwardLatch,
    cancel: CancellationToken,
    tts: Option<BoxedTTS>,
}

impl DialinSession {
    pub fn new(
        call_id: impl Into<String>,
        caller_id: impl Into<String>,
        room: RoomDetails,
        forwarder: Arc<dyn CallForwarder>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            caller_id: caller_id.into(),
            room,
            forwarder,
            latch: CallForwardLatch::new(),
            cancel: CancellationToken::new(),
            tts: None,
        }
    }

    /// Attach the synthesizer that speaks upstream text into this call.
    ///
    /// Its audio callback should already point at the call's media transport.
    pub fn with_tts(mut self, tts: BoxedTTS) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn has_tts(&self) -> bool {
        self.tts.is_some()
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn room(&self) -> &RoomDetails {
        &self.room
    }

    pub fn latch(&self) -> &CallForwardLatch {
        &self.latch
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Handle one transport event. Errors are logged, never returned, so one
    /// bad notification cannot end the call.
    pub async fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::FirstParticipantJoined { participant } => {
                info!(call_sid = %self.call_id, participant = %participant.id, "First participant joined");
            }
            TransportEvent::ParticipantLeft {
                participant,
                reason,
            } => {
                info!(
                    call_sid = %self.call_id,
                    participant = %participant.id,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "Participant left, ending session"
                );
                self.cancel.cancel();
            }
            TransportEvent::DialinReady { .. } => self.forward_call().await,
            TransportEvent::DialinConnected { data } => {
                debug!(call_sid = %self.call_id, ?data, "Dial-in connected");
            }
            TransportEvent::DialinStopped { data } => {
                debug!(call_sid = %self.call_id, ?data, "Dial-in stopped");
            }
            TransportEvent::DialinError { data } => {
                error!(call_sid = %self.call_id, ?data, "Dial-in error");
            }
            TransportEvent::DialinWarning { data } => {
                warn!(call_sid = %self.call_id, ?data, "Dial-in warning");
            }
        }
    }

    async fn forward_call(&self) {
        info!(call_sid = %self.call_id, sip_uri = %self.room.sip_endpoint, "Forwarding call");

        match self
            .latch
            .forward_once(
                self.forwarder.as_ref(),
                &self.call_id,
                &self.room.sip_endpoint,
            )
            .await
        {
            Ok(ForwardOutcome::Forwarded) => {
                info!(call_sid = %self.call_id, "Call forwarded successfully");
            }
            Ok(ForwardOutcome::AlreadyForwarded) => {
                warn!(call_sid = %self.call_id, "Call already forwarded, ignoring this event");
            }
            Err(e) => {
                error!(call_sid = %self.call_id, error = %e, "Failed to forward call");
            }
        }
    }

    /// Synthesize one utterance. Hanging up abandons it; the synthesizer
    /// still emits its stopped signal.
    async fn speak(&self, tts: &mut dyn BaseTTS, text: &str) {
        debug!(call_sid = %self.call_id, text_len = text.len(), "Speaking into call");

        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(call_sid = %self.call_id, "Session cancelled during synthesis");
            }
            result = tts.speak(text, true) => {
                if let Err(e) = result {
                    error!(call_sid = %self.call_id, error = %e, "Synthesis failed");
                }
            }
        }
    }

    /// Consume events and utterances until the session is cancelled or every
    /// event sender is gone.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        mut utterances: mpsc::Receiver<String>,
    ) {
        info!(call_sid = %self.call_id, caller = %self.caller_id, room_url = %self.room.room_url, "Dial-in session started");
        let mut tts = self.tts.take();

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },

                Some(text) = utterances.recv() => match tts.as_mut() {
                    Some(tts) => self.speak(&mut **tts, &text).await,
                    None => warn!(call_sid = %self.call_id, "No synthesizer attached, dropping text"),
                },
            }
        }

        if let Some(mut tts) = tts {
            if let Err(e) = tts.disconnect().await {
                warn!(call_sid = %self.call_id, error = %e, "Failed to disconnect synthesizer");
            }
        }
        info!(call_sid = %self.call_id, "Dial-in session ended");
    }

    /// Spawn the event loop and return the handle used to feed it.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (utterance_sender, utterance_receiver) = mpsc::channel(UTTERANCE_CHANNEL_CAPACITY);
        let handle = SessionHandle {
            call_id: self.call_id.clone(),
            room: self.room.clone(),
            sender,
            utterances: self.has_tts().then_some(utterance_sender),
            cancel: self.cancel.clone(),
        };
        let task = tokio::spawn(self.run(receiver, utterance_receiver));
        (handle, task)
    }
}

/// Cloneable reference to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    call_id: String,
    room: RoomDetails,
    sender: mpsc::Sender<TransportEvent>,
    /// Present only when the session has a synthesizer
    utterances: Option<mpsc::Sender<String>>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn room(&self) -> &RoomDetails {
        &self.room
    }

    pub async fn notify(&self, event: TransportEvent) -> TelephonyResult<()> {
        if self.cancel.is_cancelled() {
            return Err(TelephonyError::SessionClosed(self.call_id.clone()));
        }
        self.sender
            .send(event)
            .await
            .map_err(|_| TelephonyError::SessionClosed(self.call_id.clone()))
    }

    /// Queue upstream text to be spoken into the call, in order.
    pub async fn speak(&self, text: impl Into<String>) -> TelephonyResult<()> {
        let Some(utterances) = self.utterances.as_ref() else {
            return Err(TelephonyError::InvalidConfiguration(format!(
                "No synthesizer attached to call {}",
                self.call_id
            )));
        };
        if self.cancel.is_cancelled() {
            return Err(TelephonyError::SessionClosed(self.call_id.clone()));
        }
        utterances
            .send(text.into())
            .await
            .map_err(|_| TelephonyError::SessionClosed(self.call_id.clone()))
    }

    pub fn hangup(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }
}
