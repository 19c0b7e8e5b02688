//! Metric aggregation, latency histograms, and threshold evaluation.
mod histogram;
mod registry;
mod thresholds;
mod types;


pub use histogram::LatencyHistogram;
pub use registry::{MetricsRegistry, RequestSample};
pub use thresholds::{
    Aggregation, Comparison, Threshold, ThresholdExpr, ThresholdOutcome, ThresholdSet,
};
pub use types::{
    CHECKS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQ_WAITING, HTTP_REQS, ITERATION_DURATION,
    ITERATIONS, MetricKind, MetricsSnapshot, RateCounts, TrendSummary, metric_kind, submetric_key,
};
