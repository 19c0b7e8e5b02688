use super::{Config, ScenarioKind, Staging, load_config_file, parse_duration_value};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult};
use crate::metrics::{
    Aggregation, CHECKS, Comparison, HTTP_REQ_DURATION, HTTP_REQ_FAILED, ThresholdExpr,
};
use crate::test_support::base_args;

#[test]
fn resolve_trims_origins_and_keeps_credentials() -> AppResult<()> {
    let config = Config::resolve(&base_args());
    if config.base_url != "http://api.local" {
        return Err(AppError::validation(format!(
            "Unexpected base_url: {}",
            config.base_url
        )));
    }
    if config.credentials.email != "vu@example.com" {
        return Err(AppError::validation("Unexpected email"));
    }
    if config.scenario != ScenarioKind::Smoke {
        return Err(AppError::validation("Expected smoke scenario"));
    }
    if config.request_defaults.tags.get("scenario").map(String::as_str) != Some("smoke") {
        return Err(AppError::validation("Expected scenario tag"));
    }
    Ok(())
}

#[test]
fn unknown_scenario_falls_back_to_load() -> AppResult<()> {
    if ScenarioKind::from_name("soak") != ScenarioKind::Load {
        return Err(AppError::validation("Expected load fallback"));
    }
    if ScenarioKind::from_name(" SPIKE ") != ScenarioKind::Spike {
        return Err(AppError::validation("Expected case-insensitive match"));
    }

    let config = Config::resolve(&base_args());
    let fallback = config.profile_for_name("nonsense");
    if fallback.staging != *config.staging_for(ScenarioKind::Load) {
        return Err(AppError::validation("Expected load staging for unknown name"));
    }
    Ok(())
}

#[test]
fn every_kind_has_staging_and_thresholds() -> AppResult<()> {
    let config = Config::resolve(&base_args());
    for kind in ScenarioKind::ALL {
        if config.staging_for(kind).total_duration().is_zero() {
            return Err(AppError::validation(format!("{} has no staging", kind)));
        }
        if config.thresholds_for(kind).get(HTTP_REQ_DURATION).is_none() {
            return Err(AppError::validation(format!(
                "{} has no duration threshold",
                kind
            )));
        }
        if config.thresholds_for(kind).get(HTTP_REQ_FAILED).is_none() {
            return Err(AppError::validation(format!(
                "{} has no failure-rate threshold",
                kind
            )));
        }
    }
    Ok(())
}

#[test]
fn default_thresholds_leave_checks_rate_unconstrained() -> AppResult<()> {
    let config = Config::resolve(&base_args());
    for kind in ScenarioKind::ALL {
        if config.thresholds_for(kind).get(CHECKS).is_some() {
            return Err(AppError::validation(format!(
                "{} carries a checks threshold",
                kind
            )));
        }
    }
    Ok(())
}

#[test]
fn default_threshold_sources_match_their_expressions() -> AppResult<()> {
    let config = Config::resolve(&base_args());
    for kind in ScenarioKind::ALL {
        for (metric, thresholds) in config.thresholds_for(kind).iter() {
            for threshold in thresholds {
                let parsed: ThresholdExpr = threshold.source.parse()?;
                if parsed != threshold.expr {
                    return Err(AppError::validation(format!(
                        "{} {} '{}' does not match its parsed form",
                        kind, metric, threshold.source
                    )));
                }
            }
        }
    }
    Ok(())
}

#[test]
fn vus_and_duration_override_selected_staging() -> AppResult<()> {
    let mut args = base_args();
    args.scenario = "stress".to_owned();
    args.vus = Some(PositiveUsize::try_from(3)?);
    args.duration = Some(Duration::from_secs(5));

    let config = Config::resolve(&args);
    let expected = Staging::Constant {
        vus: 3,
        duration: Duration::from_secs(5),
    };
    if config.active_profile().staging != expected {
        return Err(AppError::validation("Expected constant override"));
    }
    if matches!(config.staging_for(ScenarioKind::Load), Staging::Constant { .. }) {
        return Err(AppError::validation("Override leaked into another scenario"));
    }
    Ok(())
}

#[test]
fn abort_on_fail_marks_selected_thresholds() -> AppResult<()> {
    let mut args = base_args();
    args.abort_on_fail = true;
    let config = Config::resolve(&args);

    let selected_all_fatal = config
        .thresholds_for(ScenarioKind::Smoke)
        .iter()
        .flat_map(|(_, thresholds)| thresholds.iter())
        .all(|threshold| threshold.abort_on_fail);
    if !selected_all_fatal {
        return Err(AppError::validation("Expected fatal smoke thresholds"));
    }
    let other_fatal = config
        .thresholds_for(ScenarioKind::Load)
        .iter()
        .flat_map(|(_, thresholds)| thresholds.iter())
        .any(|threshold| threshold.abort_on_fail);
    if other_fatal {
        return Err(AppError::validation("Unselected profile should stay informational"));
    }
    Ok(())
}

#[test]
fn ramping_staging_interpolates_targets() -> AppResult<()> {
    let config = Config::resolve(&base_args());
    let staging = config.staging_for(ScenarioKind::Load);

    let checkpoints = [
        (Duration::ZERO, Some(0)),
        (Duration::from_secs(60), Some(5)),
        (Duration::from_secs(120), Some(10)),
        (Duration::from_secs(480), Some(15)),
        (Duration::from_secs(600), Some(20)),
        (Duration::from_secs(16 * 60), None),
    ];
    for (elapsed, expected) in checkpoints {
        let target = staging.target_at(elapsed);
        if target != expected {
            return Err(AppError::validation(format!(
                "At {:?} expected {:?}, got {:?}",
                elapsed, expected, target
            )));
        }
    }
    if staging.max_vus() != 20 {
        return Err(AppError::validation("Expected 20 max VUs"));
    }
    Ok(())
}

#[test]
fn parse_duration_value_supports_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("10", Duration::from_secs(10)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "{} parsed as {:?}",
                input, parsed
            )));
        }
    }
    if parse_duration_value("0s").is_ok() {
        return Err(AppError::validation("Expected zero duration to fail"));
    }
    if parse_duration_value("5d").is_ok() {
        return Err(AppError::validation("Expected unknown unit to fail"));
    }
    Ok(())
}

#[test]
fn config_file_overrides_stages_and_thresholds() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadtest.toml");
    let content = r#"
[scenarios.load]
stages = [
  { duration = "30s", target = 5 },
  { duration = "10s", target = 0 },
]

[scenarios.load.thresholds]
http_req_duration = ["p(90)<800"]
"http_req_duration{name:tasks_get}" = ["max<2000"]

[scenarios.spike]
vus = 4
duration = "20s"
"#;
    std::fs::write(&path, content)?;

    let file = load_config_file(&path)?;
    let config = Config::resolve(&base_args()).with_file(&file)?;

    let load = config.profile_for(ScenarioKind::Load);
    if load.staging.total_duration() != Duration::from_secs(40) {
        return Err(AppError::validation("Unexpected load staging"));
    }
    let duration_thresholds = load
        .thresholds
        .get(HTTP_REQ_DURATION)
        .ok_or_else(|| AppError::validation("Missing duration threshold"))?;
    let first = duration_thresholds
        .first()
        .ok_or_else(|| AppError::validation("Empty duration thresholds"))?;
    if first.expr.aggregation != Aggregation::Percentile(90.0)
        || first.expr.comparison != Comparison::Lt
    {
        return Err(AppError::validation("Unexpected parsed threshold"));
    }
    if load
        .thresholds
        .get("http_req_duration{name:tasks_get}")
        .is_none()
    {
        return Err(AppError::validation("Missing submetric threshold"));
    }

    let spike = config.staging_for(ScenarioKind::Spike);
    let expected = Staging::Constant {
        vus: 4,
        duration: Duration::from_secs(20),
    };
    if *spike != expected {
        return Err(AppError::validation("Unexpected spike staging"));
    }
    Ok(())
}

#[test]
fn config_file_rejects_bad_threshold() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadtest.json");
    let content = r#"{
  "scenarios": {
    "smoke": { "thresholds": { "http_req_failed": ["ratio<0.1"] } }
  }
}"#;
    std::fs::write(&path, content)?;

    let file = load_config_file(&path)?;
    if Config::resolve(&base_args()).with_file(&file).is_ok() {
        return Err(AppError::validation("Expected invalid threshold error"));
    }
    Ok(())
}

#[test]
fn config_file_rejects_unknown_extension() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadtest.yaml");
    std::fs::write(&path, "scenarios: {}")?;
    if load_config_file(&path).is_ok() {
        return Err(AppError::validation("Expected extension error"));
    }
    Ok(())
}

#[test]
fn config_file_rejects_thresholds_that_cannot_be_observed() -> AppResult<()> {
    let dir = tempdir()?;
    let cases = [
        ("misspelled.toml", "[scenarios.load.thresholds]\nhttp_req_durtion = [\"p(95)<1\"]\n"),
        ("trend_rate.toml", "[scenarios.load.thresholds]\nhttp_req_duration = [\"rate<0.1\"]\n"),
        ("rate_percentile.toml", "[scenarios.load.thresholds]\nhttp_req_failed = [\"p(95)<1\"]\n"),
    ];
    for (file_name, content) in cases {
        let path = dir.path().join(file_name);
        std::fs::write(&path, content)?;
        let file = load_config_file(&path)?;
        if Config::resolve(&base_args()).with_file(&file).is_ok() {
            return Err(AppError::validation(format!(
                "{} should be rejected",
                file_name
            )));
        }
    }
    Ok(())
}
