use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use crate::config::MetricsSinkConfig;
use crate::error::SinkError;
use crate::summary::RunSummary;

use super::format::{escape_key, split_submetric, write_line};

/// Render every metric in `summary` as one line-protocol point stamped at
/// `timestamp_ms`, tagged with the scenario.
///
/// # Errors
///
/// Returns an error if a line cannot be written to the buffer.
pub fn line_protocol(summary: &RunSummary, timestamp_ms: i64) -> Result<String, SinkError> {
    let scenario = escape_key(summary.scenario.as_str());
    let mut output = String::new();

    for (key, trend) in &summary.trends {
        write_line(
            &mut output,
            &format!(
                "{} avg={},min={}i,med={}i,max={}i,p90={}i,p95={}i,p99={}i,count={}i {}",
                series(key, &scenario),
                trend.avg_ms,
                trend.min_ms,
                trend.med_ms,
                trend.max_ms,
                trend.p90_ms,
                trend.p95_ms,
                trend.p99_ms,
                trend.count,
                timestamp_ms
            ),
        )?;
    }
    for (key, rate) in &summary.rates {
        write_line(
            &mut output,
            &format!(
                "{} rate={},passes={}i,fails={}i {}",
                series(key, &scenario),
                rate.rate,
                rate.passes,
                rate.fails,
                timestamp_ms
            ),
        )?;
    }
    for (key, value) in &summary.counters {
        write_line(
            &mut output,
            &format!("{} value={}i {}", series(key, &scenario), value, timestamp_ms),
        )?;
    }
    for (name, counts) in &summary.checks {
        write_line(
            &mut output,
            &format!(
                "check_result,scenario={},check={} passes={}i,fails={}i {}",
                scenario,
                escape_key(name),
                counts.passes,
                counts.fails,
                timestamp_ms
            ),
        )?;
    }
    for outcome in &summary.thresholds {
        write_line(
            &mut output,
            &format!(
                "threshold,scenario={},metric={},expression={} passed={},abort_on_fail={} {}",
                scenario,
                escape_key(&outcome.metric),
                escape_key(&outcome.expression),
                outcome.passed,
                outcome.abort_on_fail,
                timestamp_ms
            ),
        )?;
    }
    Ok(output)
}

fn series(key: &str, scenario: &str) -> String {
    let (metric, name) = split_submetric(key);
    match name {
        Some(name) => format!(
            "{},scenario={},name={}",
            escape_key(metric),
            scenario,
            escape_key(name)
        ),
        None => format!("{},scenario={}", escape_key(metric), scenario),
    }
}

/// v2 write endpoint with org, bucket, and millisecond precision.
///
/// # Errors
///
/// Returns an error when the configured URL is invalid.
pub fn influx_write_url(config: &MetricsSinkConfig) -> Result<Url, SinkError> {
    let raw = format!("{}/api/v2/write", config.url);
    let mut url = Url::parse(&raw).map_err(|source| SinkError::InvalidUrl { url: raw, source })?;
    url.query_pairs_mut()
        .append_pair("org", &config.org)
        .append_pair("bucket", &config.bucket)
        .append_pair("precision", "ms");
    Ok(url)
}

/// Push the summary to InfluxDB.
///
/// # Errors
///
/// Returns an error when the request fails or the server rejects the write.
pub async fn push_influx(
    config: &MetricsSinkConfig,
    summary: &RunSummary,
    timestamp_ms: i64,
) -> Result<(), SinkError> {
    let url = influx_write_url(config)?;
    let body = line_protocol(summary, timestamp_ms)?;
    debug!("Writing {} metric lines to {}", body.lines().count(), url);

    let response = Client::new()
        .post(url.clone())
        .header("Authorization", format!("Token {}", config.token))
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .send()
        .await
        .map_err(|source| SinkError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SinkError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    info!("Metrics written to InfluxDB bucket {}", config.bucket);
    Ok(())
}
