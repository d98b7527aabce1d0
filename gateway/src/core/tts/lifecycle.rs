//! Per-request started/stopped signalling.

use std::sync::Arc;

use tracing::{debug, warn};

use super::base::AudioCallback;
use super::metrics::{TtfbTimer, TtsMetrics};

/// In-flight marker for one synthesis request.
///
/// Created by [`SynthesisGuard::start`], which emits the started signal. The
/// stopped signal (`on_complete`) is emitted by [`SynthesisGuard::finish`] or,
/// if the guard is dropped first (panic, early return, task cancellation), by
/// a task spawned from `Drop`. Either way it fires exactly once, and once
/// started it runs to the end even if the synthesizing task is cancelled.
pub struct SynthesisGuard {
    callback: Option<Arc<dyn AudioCallback>>,
    metrics: Arc<TtsMetrics>,
    ttfb: Option<TtfbTimer>,
    finished: bool,
}

impl SynthesisGuard {
    pub async fn start(callback: Option<Arc<dyn AudioCallback>>, metrics: Arc<TtsMetrics>) -> Self {
        metrics.record_request();
        if let Some(callback) = callback.as_ref() {
            callback.on_started().await;
        }

        Self {
            callback,
            metrics,
            ttfb: None,
            finished: false,
        }
    }

    pub fn callback(&self) -> Option<&Arc<dyn AudioCallback>> {
        self.callback.as_ref()
    }

    pub fn metrics(&self) -> &TtsMetrics {
        &self.metrics
    }

    pub fn start_ttfb(&mut self) {
        self.ttfb = Some(self.metrics.start_ttfb());
    }

    pub fn stop_ttfb(&mut self) {
        let Some(mut timer) = self.ttfb.take() else {
            return;
        };
        if let Some(elapsed) = self.metrics.stop_ttfb(&mut timer) {
            debug!(ttfb_ms = elapsed.as_millis() as u64, "TTFB recorded");
        }
    }

    /// Emit the stopped signal on the normal path and wait for it.
    pub async fn finish(mut self) {
        self.stop_ttfb();
        self.finished = true;
        let Some(callback) = self.callback.take() else {
            return;
        };

        // Runs to completion even if this future is dropped mid-await.
        let completion = tokio::spawn(async move {
            callback.on_complete().await;
        });
        if let Err(e) = completion.await {
            warn!(error = %e, "Stop signal task failed");
        }
    }
}

impl Drop for SynthesisGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.stop_ttfb();

        let Some(callback) = self.callback.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Synthesis interrupted, emitting stop signal from guard");
                handle.spawn(async move {
                    callback.on_complete().await;
                });
            }
            Err(_) => warn!("Synthesis guard dropped outside a runtime, stop signal lost"),
        }
    }
}
