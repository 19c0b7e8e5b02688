use std::time::Duration;

use crate::metrics::{
    Aggregation, Comparison, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQ_WAITING,
    ITERATION_DURATION, Threshold, ThresholdExpr, ThresholdSet,
};

use super::types::{ScenarioProfile, ScenarioProfiles, Stage, Staging};

/// Duration used when only a VU override is given.
pub(super) const DEFAULT_OVERRIDE_DURATION: Duration = Duration::from_secs(30);

const fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

const fn mins(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}

const fn stage(duration: Duration, target: usize) -> Stage {
    Stage { duration, target }
}

fn threshold(source: &str, aggregation: Aggregation, comparison: Comparison, bound: f64) -> Threshold {
    Threshold {
        source: source.to_owned(),
        expr: ThresholdExpr {
            aggregation,
            comparison,
            bound,
        },
        abort_on_fail: false,
    }
}

fn p95_below(bound: f64, source: &str) -> Threshold {
    threshold(source, Aggregation::Percentile(95.0), Comparison::Lt, bound)
}

fn rate_below(bound: f64, source: &str) -> Threshold {
    threshold(source, Aggregation::Rate, Comparison::Lt, bound)
}

fn smoke_profile() -> ScenarioProfile {
    let mut thresholds = ThresholdSet::default();
    thresholds.push(HTTP_REQ_DURATION, p95_below(1000.0, "p(95)<1000"));
    thresholds.push(HTTP_REQ_FAILED, rate_below(0.01, "rate<0.01"));
    ScenarioProfile {
        staging: Staging::Constant {
            vus: 1,
            duration: mins(1),
        },
        thresholds,
    }
}

fn load_profile() -> ScenarioProfile {
    let mut thresholds = ThresholdSet::default();
    thresholds.push(HTTP_REQ_DURATION, p95_below(500.0, "p(95)<500"));
    thresholds.push(
        HTTP_REQ_DURATION,
        threshold(
            "p(99)<1000",
            Aggregation::Percentile(99.0),
            Comparison::Lt,
            1000.0,
        ),
    );
    thresholds.push(HTTP_REQ_FAILED, rate_below(0.05, "rate<0.05"));
    thresholds.push(HTTP_REQ_WAITING, p95_below(400.0, "p(95)<400"));
    thresholds.push(ITERATION_DURATION, p95_below(10_000.0, "p(95)<10000"));
    ScenarioProfile {
        staging: Staging::Ramping(vec![
            stage(mins(2), 10),
            stage(mins(5), 10),
            stage(mins(2), 20),
            stage(mins(5), 20),
            stage(mins(2), 0),
        ]),
        thresholds,
    }
}

fn stress_profile() -> ScenarioProfile {
    let mut thresholds = ThresholdSet::default();
    thresholds.push(HTTP_REQ_DURATION, p95_below(2000.0, "p(95)<2000"));
    thresholds.push(HTTP_REQ_FAILED, rate_below(0.1, "rate<0.1"));
    thresholds.push(ITERATION_DURATION, p95_below(20_000.0, "p(95)<20000"));
    ScenarioProfile {
        staging: Staging::Ramping(vec![
            stage(mins(2), 50),
            stage(mins(5), 50),
            stage(mins(2), 100),
            stage(mins(5), 100),
            stage(mins(2), 150),
            stage(mins(5), 150),
            stage(mins(5), 0),
        ]),
        thresholds,
    }
}

fn spike_profile() -> ScenarioProfile {
    let mut thresholds = ThresholdSet::default();
    thresholds.push(HTTP_REQ_DURATION, p95_below(3000.0, "p(95)<3000"));
    thresholds.push(HTTP_REQ_FAILED, rate_below(0.15, "rate<0.15"));
    ScenarioProfile {
        staging: Staging::Ramping(vec![
            stage(secs(10), 10),
            stage(mins(1), 10),
            stage(secs(10), 200),
            stage(mins(3), 200),
            stage(secs(10), 10),
            stage(mins(3), 10),
            stage(secs(10), 0),
        ]),
        thresholds,
    }
}

pub(super) fn default_profiles() -> ScenarioProfiles {
    ScenarioProfiles {
        smoke: smoke_profile(),
        load: load_profile(),
        stress: stress_profile(),
        spike: spike_profile(),
    }
}
