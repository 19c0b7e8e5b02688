//! End-of-run summary: aggregated metrics, checks, and threshold verdicts.
use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::{
    checks::CheckCounts,
    config::ScenarioKind,
    metrics::{MetricsSnapshot, RateCounts, ThresholdOutcome, ThresholdSet, TrendSummary},
    scenarios::RunReport,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSummary {
    pub passes: u64,
    pub fails: u64,
    pub rate: f64,
}

impl From<RateCounts> for RateSummary {
    fn from(counts: RateCounts) -> Self {
        Self {
            passes: counts.passes,
            fails: counts.fails(),
            rate: counts.rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: ScenarioKind,
    pub started_at: String,
    pub duration_ms: u64,
    pub iterations: u64,
    pub peak_vus: usize,
    pub interrupted: bool,
    pub trends: BTreeMap<String, TrendSummary>,
    pub rates: BTreeMap<String, RateSummary>,
    pub counters: BTreeMap<String, u64>,
    pub checks: BTreeMap<String, CheckCounts>,
    pub thresholds: Vec<ThresholdOutcome>,
}

impl RunSummary {
    /// Evaluate `thresholds` against the final metrics and collect
    /// everything worth reporting.
    #[must_use]
    pub fn new(
        report: &RunReport,
        snapshot: &MetricsSnapshot,
        checks: BTreeMap<String, CheckCounts>,
        thresholds: &ThresholdSet,
    ) -> Self {
        Self {
            scenario: report.scenario,
            started_at: report
                .started_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            iterations: report.stats.iterations,
            peak_vus: report.stats.peak_vus,
            interrupted: report.stats.interrupted,
            trends: snapshot.trend_summaries(),
            rates: snapshot
                .rates
                .iter()
                .map(|(name, counts)| (name.clone(), RateSummary::from(*counts)))
                .collect(),
            counters: snapshot.counters.clone(),
            checks,
            thresholds: thresholds.evaluate(snapshot),
        }
    }

    pub fn breached(&self) -> impl Iterator<Item = &ThresholdOutcome> {
        self.thresholds.iter().filter(|outcome| !outcome.passed)
    }

    /// Breached thresholds that fail the run.
    #[must_use]
    pub fn fatal_breaches(&self) -> usize {
        self.thresholds
            .iter()
            .filter(|outcome| outcome.is_fatal_breach())
            .count()
    }
}
