use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use super::types::{
    CHECKS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQ_WAITING, HTTP_REQS, ITERATION_DURATION,
    ITERATIONS, MetricsSnapshot, RateCounts, submetric_key,
};
use super::LatencyHistogram;

/// One completed HTTP request as seen by the metric pipeline.
#[derive(Debug, Clone)]
pub struct RequestSample {
    /// Value of the request's `name` tag.
    pub name: String,
    pub duration: Duration,
    pub waiting: Duration,
    pub failed: bool,
}

#[derive(Debug, Default)]
struct MetricsState {
    trends: BTreeMap<String, LatencyHistogram>,
    rates: BTreeMap<String, RateCounts>,
    counters: BTreeMap<String, u64>,
}

impl MetricsState {
    fn record_trend(&mut self, key: String, value: Duration) {
        let latency_ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        let hist = match self.trends.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match LatencyHistogram::new() {
                Ok(hist) => entry.insert(hist),
                Err(err) => {
                    warn!("Dropping sample for {}: {}", entry.key(), err);
                    return;
                }
            },
        };
        if let Err(err) = hist.record(latency_ms) {
            warn!("Dropping latency sample: {}", err);
        }
    }

    fn record_rate(&mut self, key: String, passed: bool) {
        self.rates.entry(key).or_default().add(passed);
    }

    fn increment(&mut self, key: &str) {
        let counter = self.counters.entry(key.to_owned()).or_insert(0);
        *counter = counter.saturating_add(1);
    }
}

/// Thread-safe aggregation point shared by every virtual user.
#[derive(Debug)]
pub struct MetricsRegistry {
    started: Instant,
    state: Mutex<MetricsState>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            state: Mutex::new(MetricsState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_request(&self, sample: &RequestSample) {
        let mut state = self.lock();
        state.increment(HTTP_REQS);
        state.record_trend(HTTP_REQ_DURATION.to_owned(), sample.duration);
        state.record_trend(
            submetric_key(HTTP_REQ_DURATION, &sample.name),
            sample.duration,
        );
        state.record_trend(HTTP_REQ_WAITING.to_owned(), sample.waiting);
        // http_req_failed is a rate of failures: a "pass" is a failed request.
        state.record_rate(HTTP_REQ_FAILED.to_owned(), sample.failed);
        state.record_rate(submetric_key(HTTP_REQ_FAILED, &sample.name), sample.failed);
    }

    pub fn record_iteration(&self, duration: Duration) {
        let mut state = self.lock();
        state.increment(ITERATIONS);
        state.record_trend(ITERATION_DURATION.to_owned(), duration);
    }

    pub fn record_check(&self, passed: bool) {
        self.lock().record_rate(CHECKS.to_owned(), passed);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        MetricsSnapshot {
            elapsed: self.started.elapsed(),
            trends: state.trends.clone(),
            rates: state.rates.clone(),
            counters: state.counters.clone(),
        }
    }
}
