use std::collections::BTreeMap;
use std::time::Duration;

use super::RunSummary;
use crate::checks::CheckCounts;
use crate::config::ScenarioKind;
use crate::error::{AppError, AppResult};
use crate::metrics::{
    CHECKS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, MetricsRegistry, RequestSample, ThresholdSet,
};
use crate::system::summary_lines;
use crate::test_support::sample_report;

fn registry_with_traffic() -> MetricsRegistry {
    let metrics = MetricsRegistry::new();
    for (index, latency_ms) in [120_u64, 180, 240, 2_400].into_iter().enumerate() {
        metrics.record_request(&RequestSample {
            name: "tasks_get".to_owned(),
            duration: Duration::from_millis(latency_ms),
            waiting: Duration::from_millis(latency_ms / 2),
            failed: index == 3,
        });
    }
    metrics.record_check(true);
    metrics.record_check(false);
    metrics
}

#[test]
fn summary_reports_breaches_and_fatality() -> AppResult<()> {
    let metrics = registry_with_traffic();
    let mut thresholds = ThresholdSet::default();
    thresholds.insert(HTTP_REQ_DURATION, ["p(95)<1000", "avg<5000"].as_slice())?;
    thresholds.insert(HTTP_REQ_FAILED, ["rate<0.5"].as_slice())?;
    thresholds.insert("iteration_duration", ["p(95)<100"].as_slice())?;
    let thresholds = thresholds.with_abort_on_fail(true);

    let summary = RunSummary::new(
        &sample_report(ScenarioKind::Smoke),
        &metrics.snapshot(),
        BTreeMap::new(),
        &thresholds,
    );

    let breached: Vec<&str> = summary
        .breached()
        .map(|outcome| outcome.expression.as_str())
        .collect();
    if breached != ["p(95)<1000"] {
        return Err(AppError::validation(format!(
            "Unexpected breaches {:?}",
            breached
        )));
    }
    if summary.fatal_breaches() != 1 {
        return Err(AppError::validation("Expected one fatal breach"));
    }
    let no_data = summary
        .thresholds
        .iter()
        .find(|outcome| outcome.metric == "iteration_duration")
        .ok_or_else(|| AppError::validation("Missing iteration threshold"))?;
    if no_data.observed.is_some() || !no_data.passed {
        return Err(AppError::validation("Thresholds without data should pass"));
    }
    let failed = summary
        .rates
        .get(HTTP_REQ_FAILED)
        .ok_or_else(|| AppError::validation("Missing failure rate"))?;
    if failed.passes != 1 || failed.fails != 3 {
        return Err(AppError::validation("Unexpected failure counts"));
    }
    Ok(())
}

#[test]
fn informational_breaches_are_not_fatal() -> AppResult<()> {
    let metrics = registry_with_traffic();
    let mut thresholds = ThresholdSet::default();
    thresholds.insert(CHECKS, ["rate>0.95"].as_slice())?;

    let summary = RunSummary::new(
        &sample_report(ScenarioKind::Load),
        &metrics.snapshot(),
        BTreeMap::new(),
        &thresholds,
    );
    if summary.breached().count() != 1 || summary.fatal_breaches() != 0 {
        return Err(AppError::validation("Expected one informational breach"));
    }
    Ok(())
}

#[test]
fn summary_lines_include_checks_and_thresholds() -> AppResult<()> {
    let metrics = registry_with_traffic();
    let mut thresholds = ThresholdSet::default();
    thresholds.insert(HTTP_REQ_DURATION, ["p(95)<1000"].as_slice())?;
    let checks = BTreeMap::from([(
        "login status is 200".to_owned(),
        CheckCounts { passes: 3, fails: 1 },
    )]);

    let summary = RunSummary::new(
        &sample_report(ScenarioKind::Smoke),
        &metrics.snapshot(),
        checks,
        &thresholds,
    );
    let lines = summary_lines(&summary);
    let expected = [
        "checks: 50.00% pass=1 fail=1",
        "  [FAILED] login status is 200 (3/4)",
        "http_reqs: 4",
    ];
    for line in expected {
        if !lines.iter().any(|candidate| candidate == line) {
            return Err(AppError::validation(format!(
                "Missing line '{}' in {:?}",
                line, lines
            )));
        }
    }
    if !lines
        .iter()
        .any(|line| line.starts_with("  [FAIL] http_req_duration p(95)<1000"))
    {
        return Err(AppError::validation("Missing threshold verdict"));
    }
    Ok(())
}
