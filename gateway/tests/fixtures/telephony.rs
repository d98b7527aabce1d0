//! In-process room provisioner and call forwarder

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use dialin_gateway::core::dialin::{
    CallForwarder, RoomDetails, RoomProvisioner, TelephonyError, TelephonyResult,
};

pub fn room_details(name: &str) -> RoomDetails {
    RoomDetails {
        room_url: format!("https://example.daily.co/{name}"),
        token: format!("token-{name}"),
        sip_endpoint: format!("sip:{name}@sip.daily.co"),
    }
}

/// Hands out rooms named after a counter, or fails every request.
#[derive(Default)]
pub struct MockProvisioner {
    pub fail: bool,
    pub callers: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MockProvisioner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RoomProvisioner for MockProvisioner {
    async fn create_room(&self, caller_id: &str) -> TelephonyResult<RoomDetails> {
        self.callers.lock().push(caller_id.to_string());
        if self.fail {
            return Err(TelephonyError::MissingSipEndpoint);
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(room_details(&format!("room{n}")))
    }
}

/// Records every forwarding request.
#[derive(Default)]
pub struct MockForwarder {
    pub forwarded: Mutex<Vec<(String, String)>>,
}

impl MockForwarder {
    pub fn count(&self) -> usize {
        self.forwarded.lock().len()
    }
}

#[async_trait]
impl CallForwarder for MockForwarder {
    async fn forward_call(&self, call_id: &str, sip_uri: &str) -> TelephonyResult<()> {
        self.forwarded
            .lock()
            .push((call_id.to_string(), sip_uri.to_string()));
        Ok(())
    }
}
