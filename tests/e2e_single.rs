mod support_single;

use std::fs;

use tempfile::tempdir;

use support_single::{Routes, run_loadtest, spawn_http_server};

fn base_args(url: &str) -> Vec<String> {
    vec![
        "--base-url".to_owned(),
        url.to_owned(),
        "--frontend-url".to_owned(),
        url.to_owned(),
        "--scenario".to_owned(),
        "smoke".to_owned(),
        "--vus".to_owned(),
        "1".to_owned(),
        "--duration".to_owned(),
        "1s".to_owned(),
        "--timeout".to_owned(),
        "2s".to_owned(),
        "--no-color".to_owned(),
    ]
}

fn describe(output: &std::process::Output) -> String {
    format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_smoke_against_healthy_backend() -> Result<(), String> {
    let (url, _server) = spawn_http_server(Routes::healthy())?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("summary.json");

    let mut args = base_args(&url);
    args.push("--abort-on-fail".to_owned());
    args.push("--summary-export".to_owned());
    args.push(export.to_string_lossy().into_owned());

    let output = run_loadtest(args)?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Thresholds:") {
        return Err(format!("Missing threshold report\n{}", describe(&output)));
    }

    let content =
        fs::read_to_string(&export).map_err(|err| format!("read summary failed: {}", err))?;
    let summary: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| format!("parse summary failed: {}", err))?;
    if summary.get("scenario").and_then(serde_json::Value::as_str) != Some("smoke") {
        return Err(format!("Unexpected summary: {}", content));
    }
    Ok(())
}

#[test]
fn e2e_setup_failure_exits_non_zero() -> Result<(), String> {
    let routes = Routes {
        health_status: 500,
        api_status: 200,
    };
    let (url, _server) = spawn_http_server(routes)?;

    let output = run_loadtest(base_args(&url))?;
    if output.status.success() {
        return Err(format!("Expected setup failure\n{}", describe(&output)));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("Health check") || !stderr.contains("/health/") {
        return Err(format!("Expected health check failure\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_breached_thresholds_fail_with_abort_on_fail() -> Result<(), String> {
    let routes = Routes {
        health_status: 200,
        api_status: 500,
    };
    let (url, _server) = spawn_http_server(routes)?;

    let output = run_loadtest(base_args(&url))?;
    if !output.status.success() {
        return Err(format!(
            "Breaches without abort-on-fail should not fail the run\n{}",
            describe(&output)
        ));
    }

    let mut args = base_args(&url);
    args.push("--abort-on-fail".to_owned());
    let output = run_loadtest(args)?;
    if output.status.success() {
        return Err(format!("Expected breached thresholds\n{}", describe(&output)));
    }
    Ok(())
}
