use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::LatencyHistogram;

pub const HTTP_REQ_DURATION: &str = "http_req_duration";
pub const HTTP_REQ_WAITING: &str = "http_req_waiting";
pub const HTTP_REQ_FAILED: &str = "http_req_failed";
pub const HTTP_REQS: &str = "http_reqs";
pub const ITERATION_DURATION: &str = "iteration_duration";
pub const ITERATIONS: &str = "iterations";
pub const CHECKS: &str = "checks";

/// Key of a metric restricted to requests carrying the given `name` tag,
/// e.g. `http_req_duration{name:tasks_get}`.
#[must_use]
pub fn submetric_key(metric: &str, name: &str) -> String {
    format!("{}{{name:{}}}", metric, name)
}

/// How a built-in metric aggregates its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Trend,
    Rate,
    Counter,
}

impl MetricKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Trend => "trend",
            MetricKind::Rate => "rate",
            MetricKind::Counter => "counter",
        }
    }
}

/// Kind of a built-in metric key. Per-name submetrics exist only for
/// `http_req_duration` and `http_req_failed`.
#[must_use]
pub fn metric_kind(key: &str) -> Option<MetricKind> {
    let base = match key.split_once('{') {
        Some((base, selector)) => {
            let name = selector.strip_prefix("name:")?.strip_suffix('}')?;
            if name.is_empty() || !matches!(base, HTTP_REQ_DURATION | HTTP_REQ_FAILED) {
                return None;
            }
            base
        }
        None => key,
    };
    match base {
        HTTP_REQ_DURATION | HTTP_REQ_WAITING | ITERATION_DURATION => Some(MetricKind::Trend),
        HTTP_REQ_FAILED | CHECKS => Some(MetricKind::Rate),
        HTTP_REQS | ITERATIONS => Some(MetricKind::Counter),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateCounts {
    pub passes: u64,
    pub total: u64,
}

impl RateCounts {
    pub(crate) const fn add(&mut self, passed: bool) {
        if passed {
            self.passes = self.passes.saturating_add(1);
        }
        self.total = self.total.saturating_add(1);
    }

    #[must_use]
    pub const fn fails(&self) -> u64 {
        self.total.saturating_sub(self.passes)
    }

    /// Fraction of passing samples, 0 when nothing was recorded.
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passes as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub count: u64,
    pub avg_ms: f64,
    pub min_ms: u64,
    pub med_ms: u64,
    pub max_ms: u64,
    pub p90_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl From<&LatencyHistogram> for TrendSummary {
    fn from(hist: &LatencyHistogram) -> Self {
        Self {
            count: hist.count(),
            avg_ms: hist.mean(),
            min_ms: hist.min(),
            med_ms: hist.percentile(50.0),
            max_ms: hist.max(),
            p90_ms: hist.percentile(90.0),
            p95_ms: hist.percentile(95.0),
            p99_ms: hist.percentile(99.0),
        }
    }
}

/// Point-in-time copy of every aggregated metric.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub elapsed: Duration,
    pub trends: BTreeMap<String, LatencyHistogram>,
    pub rates: BTreeMap<String, RateCounts>,
    pub counters: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn trend(&self, metric: &str) -> Option<&LatencyHistogram> {
        self.trends.get(metric)
    }

    #[must_use]
    pub fn rate(&self, metric: &str) -> Option<RateCounts> {
        self.rates.get(metric).copied()
    }

    #[must_use]
    pub fn counter(&self, metric: &str) -> Option<u64> {
        self.counters.get(metric).copied()
    }

    #[must_use]
    pub fn trend_summaries(&self) -> BTreeMap<String, TrendSummary> {
        self.trends
            .iter()
            .map(|(name, hist)| (name.clone(), TrendSummary::from(hist)))
            .collect()
    }
}
