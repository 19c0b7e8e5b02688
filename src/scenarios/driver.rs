use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::{
    config::{ScenarioKind, Staging},
    endpoints::Endpoint,
    error::{AppError, AppResult, HttpError},
    flows::VuContext,
    http::RequestParams,
    shutdown::ShutdownSender,
};

use super::bodies::run_iteration;
use super::runner::{RunnerStats, run_vus};

/// Timeout of the pre-flight health check.
pub const SETUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Setup,
    Iterating,
    Teardown,
    Finished,
    /// Setup failed; no iteration ran.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub scenario: ScenarioKind,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub stats: RunnerStats,
}

/// Runs one scenario: health-check setup, staged iterations, teardown.
#[derive(Debug)]
pub struct ScenarioDriver {
    kind: ScenarioKind,
    staging: Staging,
    ctx: VuContext,
    state: DriverState,
}

impl ScenarioDriver {
    #[must_use]
    pub fn new(ctx: VuContext) -> Self {
        let kind = ctx.config.scenario;
        let staging = ctx.config.active_profile().staging.clone();
        Self::with_staging(ctx, kind, staging)
    }

    #[must_use]
    pub fn with_staging(ctx: VuContext, kind: ScenarioKind, staging: Staging) -> Self {
        Self {
            kind,
            staging,
            ctx,
            state: DriverState::Setup,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Run the scenario to completion.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::SetupFailed`] when the health check does not
    /// answer `200`, or the fatal error that aborted an iteration.
    pub async fn run(&mut self, shutdown_tx: &ShutdownSender) -> AppResult<RunReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        info!(
            "Starting {} scenario against {} ({} max VUs over {}s)",
            self.kind,
            self.ctx.config.base_url,
            self.staging.max_vus(),
            self.staging.total_duration().as_secs()
        );

        if let Err(err) = self.setup().await {
            self.state = DriverState::Aborted;
            error!("Setup failed, no iterations will run: {}", err);
            return Err(err);
        }

        self.state = DriverState::Iterating;
        let ctx = self.ctx.clone();
        let kind = self.kind;
        let outcome = run_vus(
            &self.staging,
            shutdown_tx,
            self.ctx.executor.metrics().clone(),
            move || {
                let ctx = ctx.clone();
                async move { run_iteration(kind, &ctx).await.map(drop) }
            },
        )
        .await;

        self.state = DriverState::Teardown;
        let report = outcome.map(|stats| RunReport {
            scenario: self.kind,
            started_at,
            elapsed: started.elapsed(),
            stats,
        });
        match &report {
            Ok(report) => teardown(report),
            Err(err) => warn!("{} scenario aborted: {}", self.kind, err),
        }
        self.state = DriverState::Finished;
        report
    }

    async fn setup(&self) -> AppResult<()> {
        let url = self.ctx.endpoints.url(Endpoint::Health);
        let params = RequestParams::new()
            .tag("flow", "setup")
            .timeout(SETUP_TIMEOUT)
            .expect(&[200]);
        let response = self.ctx.executor.get(&url, Some(&params)).await?;
        if response.status == 200 {
            info!("Health check passed in {}ms", response.duration.as_millis());
            return Ok(());
        }
        let reason = response
            .error
            .unwrap_or_else(|| format!("status {}", response.status));
        Err(AppError::http(HttpError::SetupFailed { url, reason }))
    }
}

fn teardown(report: &RunReport) {
    let finished_at = report
        .started_at
        .checked_add_signed(
            chrono::Duration::from_std(report.elapsed).unwrap_or_else(|_| chrono::Duration::zero()),
        )
        .unwrap_or(report.started_at);
    info!(
        "{} scenario finished at {} after {:.1}s: {} iterations, peak {} VUs{}",
        report.scenario,
        finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        report.elapsed.as_secs_f64(),
        report.stats.iterations,
        report.stats.peak_vus,
        if report.stats.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    );
}
