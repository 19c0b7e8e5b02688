use crate::metrics::{CHECKS, ThresholdOutcome, TrendSummary};
use crate::summary::RunSummary;

pub(crate) fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Scenario: {} started {} ran {:.1}s",
        summary.scenario,
        summary.started_at,
        duration_secs(summary.duration_ms)
    ));
    lines.push(format!(
        "iterations: {} peak_vus: {}{}",
        summary.iterations,
        summary.peak_vus,
        if summary.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    ));

    if let Some(checks) = summary.rates.get(CHECKS) {
        lines.push(format!(
            "checks: {:.2}% pass={} fail={}",
            checks.rate * 100.0,
            checks.passes,
            checks.fails
        ));
    }
    for (name, counts) in &summary.checks {
        let marker = if counts.fails == 0 { "ok" } else { "FAILED" };
        lines.push(format!(
            "  [{}] {} ({}/{})",
            marker,
            name,
            counts.passes,
            counts.passes.saturating_add(counts.fails)
        ));
    }

    for (name, trend) in &summary.trends {
        lines.push(format!("{}: {}", name, format_trend(trend)));
    }
    for (name, rate) in summary.rates.iter().filter(|(name, _)| name.as_str() != CHECKS) {
        lines.push(format!(
            "{}: {:.2}% ({} of {})",
            name,
            rate.rate * 100.0,
            rate.passes,
            rate.passes.saturating_add(rate.fails)
        ));
    }
    for (name, value) in &summary.counters {
        lines.push(format!("{}: {}", name, value));
    }

    if !summary.thresholds.is_empty() {
        lines.push("Thresholds:".to_owned());
        lines.extend(summary.thresholds.iter().map(threshold_line));
    }
    lines
}

fn format_trend(trend: &TrendSummary) -> String {
    format!(
        "avg={:.2}ms min={}ms med={}ms max={}ms p(90)={}ms p(95)={}ms p(99)={}ms count={}",
        trend.avg_ms,
        trend.min_ms,
        trend.med_ms,
        trend.max_ms,
        trend.p90_ms,
        trend.p95_ms,
        trend.p99_ms,
        trend.count
    )
}

pub(crate) fn threshold_line(outcome: &ThresholdOutcome) -> String {
    let verdict = if outcome.passed { "PASS" } else { "FAIL" };
    let observed = outcome
        .observed
        .map_or_else(|| "no data".to_owned(), |value| format!("{:.2}", value));
    format!(
        "  [{}] {} {} (observed {}){}",
        verdict,
        outcome.metric,
        outcome.expression,
        observed,
        if outcome.abort_on_fail {
            " abort-on-fail"
        } else {
            ""
        }
    )
}

fn duration_secs(duration_ms: u64) -> f64 {
    duration_ms as f64 / 1000.0
}
