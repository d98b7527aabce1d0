//! Synthesis metrics collection
//!
//! Counters are plain atomics so a provider can share one collector across
//! requests without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::base::{TTSError, TTSErrorKind};

/// Metrics collector for a synthesis provider
#[derive(Debug)]
pub struct TtsMetrics {
    requests: AtomicU64,
    successes: AtomicU64,
    service_failures: AtomicU64,
    decode_failures: AtomicU64,
    characters: AtomicU64,
    frames: AtomicU64,
    audio_bytes: AtomicU64,

    /// Time to first byte (microseconds)
    ttfb_count: AtomicU64,
    ttfb_total_us: AtomicU64,
    ttfb_last_us: AtomicU64,
    ttfb_min_us: AtomicU64,
}

/// Point-in-time copy of [`TtsMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsMetricsSnapshot {
    pub requests: u64,
    pub successes: u64,
    pub service_failures: u64,
    pub decode_failures: u64,
    pub characters: u64,
    pub frames: u64,
    pub audio_bytes: u64,
    pub ttfb_samples: u64,
    pub ttfb_last_ms: Option<f64>,
    pub ttfb_min_ms: Option<f64>,
    pub ttfb_avg_ms: Option<f64>,
}

/// Running time-to-first-byte measurement; records at most once.
#[derive(Debug)]
pub struct TtfbTimer {
    started: Option<Instant>,
}

impl TtfbTimer {
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

impl TtsMetrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            service_failures: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            characters: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            audio_bytes: AtomicU64::new(0),
            ttfb_count: AtomicU64::new(0),
            ttfb_total_us: AtomicU64::new(0),
            ttfb_last_us: AtomicU64::new(0),
            ttfb_min_us: AtomicU64::new(u64::MAX),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Start a TTFB measurement for one request.
    pub fn start_ttfb(&self) -> TtfbTimer {
        TtfbTimer {
            started: Some(Instant::now()),
        }
    }

    /// Stop a TTFB measurement. Stopping twice records nothing the second time.
    pub fn stop_ttfb(&self, timer: &mut TtfbTimer) -> Option<Duration> {
        let elapsed = timer.started.take()?.elapsed();
        let us = elapsed.as_micros().min(u64::MAX as u128) as u64;

        self.ttfb_count.fetch_add(1, Ordering::Relaxed);
        self.ttfb_total_us.fetch_add(us, Ordering::Relaxed);
        self.ttfb_last_us.store(us, Ordering::Relaxed);
        self.ttfb_min_us.fetch_min(us, Ordering::Relaxed);

        Some(elapsed)
    }

    /// Usage metrics for a successfully read response.
    pub fn record_usage(&self, text: &str) {
        self.characters
            .fetch_add(text.chars().count() as u64, Ordering::Relaxed);
    }

    pub fn record_frame(&self, bytes: usize) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.audio_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, error: &TTSError) {
        match error.kind() {
            TTSErrorKind::AudioDecode => {
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
            }
            TTSErrorKind::SynthesisService | TTSErrorKind::Configuration => {
                self.service_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> TtsMetricsSnapshot {
        let ttfb_samples = self.ttfb_count.load(Ordering::Relaxed);
        let to_ms = |us: u64| us as f64 / 1000.0;

        let (ttfb_last_ms, ttfb_min_ms, ttfb_avg_ms) = if ttfb_samples == 0 {
            (None, None, None)
        } else {
            let total = self.ttfb_total_us.load(Ordering::Relaxed);
            (
                Some(to_ms(self.ttfb_last_us.load(Ordering::Relaxed))),
                Some(to_ms(self.ttfb_min_us.load(Ordering::Relaxed))),
                Some(to_ms(total) / ttfb_samples as f64),
            )
        };

        TtsMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            service_failures: self.service_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            characters: self.characters.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            audio_bytes: self.audio_bytes.load(Ordering::Relaxed),
            ttfb_samples,
            ttfb_last_ms,
            ttfb_min_ms,
            ttfb_avg_ms,
        }
    }
}

impl Default for TtsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_empty() {
        let snapshot = TtsMetrics::new().snapshot();
        assert_eq!(snapshot.requests, 0);
        assert_eq!(snapshot.ttfb_samples, 0);
        assert!(snapshot.ttfb_min_ms.is_none());
    }

    #[test]
    fn test_ttfb_records_once() {
        let metrics = TtsMetrics::new();
        let mut timer = metrics.start_ttfb();
        assert!(timer.is_running());

        assert!(metrics.stop_ttfb(&mut timer).is_some());
        assert!(metrics.stop_ttfb(&mut timer).is_none());
        assert!(!timer.is_running());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ttfb_samples, 1);
        assert!(snapshot.ttfb_last_ms.is_some());
        assert_eq!(snapshot.ttfb_last_ms, snapshot.ttfb_min_ms);
    }

    #[test]
    fn test_usage_counts_characters_not_bytes() {
        let metrics = TtsMetrics::new();
        metrics.record_usage("ನಮಸ್ಕಾರ");
        assert_eq!(metrics.snapshot().characters, 7);
    }

    #[test]
    fn test_errors_split_by_kind() {
        let metrics = TtsMetrics::new();
        metrics.record_error(&TTSError::ProviderError("503".into()));
        metrics.record_error(&TTSError::NetworkError("timeout".into()));
        metrics.record_error(&TTSError::AudioProcessingFailed("bad".into()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.service_failures, 2);
        assert_eq!(snapshot.decode_failures, 1);
    }

    #[test]
    fn test_frames_and_bytes() {
        let metrics = TtsMetrics::new();
        metrics.record_frame(3200);
        metrics.record_frame(1600);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames, 2);
        assert_eq!(snapshot.audio_bytes, 4800);
    }
}
