//! Process entry: parse arguments, run the selected scenario, report.
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use crate::args::TesterArgs;
use crate::checks::CheckRecorder;
use crate::config::{Config, load_config};
use crate::error::{AppResult, MetricsError};
use crate::flows::{Pacing, VuContext};
use crate::http::{RequestExecutor, ReqwestTransport};
use crate::metrics::MetricsRegistry;
use crate::scenarios::ScenarioDriver;
use crate::shutdown::shutdown_channel;
use crate::sinks::{export_json, push_influx};
use crate::summary::RunSummary;
use crate::system::logger::init_logging;
use crate::system::shutdown_handlers::setup_signal_shutdown_handler;
use crate::system::summary_lines;

/// Run the CLI to completion.
///
/// # Errors
///
/// Returns an error when configuration is invalid, setup fails, or a
/// threshold marked abort-on-fail is breached.
pub fn run() -> AppResult<()> {
    let args = TesterArgs::parse();
    init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn resolve_config(args: &TesterArgs) -> AppResult<Config> {
    let config = Config::resolve(args);
    match load_config(args.config.as_deref())? {
        Some(file) => Ok(config.with_file(&file)?),
        None => Ok(config),
    }
}

async fn run_async(args: TesterArgs) -> AppResult<()> {
    let config = Arc::new(resolve_config(&args)?);
    info!(
        "Running {} scenario against {} (frontend {})",
        config.scenario, config.base_url, config.frontend_url
    );

    let metrics = Arc::new(MetricsRegistry::new());
    let transport = Arc::new(ReqwestTransport::new()?);
    let executor = RequestExecutor::new(
        transport,
        config.request_defaults.clone(),
        metrics.clone(),
    );
    let checks = Arc::new(CheckRecorder::new(metrics.clone()));
    let ctx = VuContext::new(config.clone(), executor, checks.clone(), Pacing::human());

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut driver = ScenarioDriver::new(ctx);
    let result = driver.run(&shutdown_tx).await;
    signal_handle.abort();
    let report = result?;

    let summary = RunSummary::new(
        &report,
        &metrics.snapshot(),
        checks.snapshot(),
        &config.active_profile().thresholds,
    );
    for line in summary_lines(&summary) {
        println!("{}", line);
    }

    if let Some(path) = config.summary_export.as_deref() {
        export_json(&summary, path)?;
    }
    if config.metrics_sink.enabled
        && let Err(err) =
            push_influx(&config.metrics_sink, &summary, Utc::now().timestamp_millis()).await
    {
        warn!("Failed to push metrics: {}", err);
    }

    let fatal = summary.fatal_breaches();
    if fatal > 0 {
        error!("{} threshold(s) breached", fatal);
        return Err(MetricsError::ThresholdsBreached { count: fatal }.into());
    }
    Ok(())
}
