use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, error};

use crate::{
    config::Staging,
    error::{AppError, AppResult},
    metrics::MetricsRegistry,
    shutdown::ShutdownSender,
};

/// How often the VU count is reconciled with the staging profile.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerStats {
    pub iterations: u64,
    pub peak_vus: usize,
    /// Stopped by a shutdown signal before the last stage ended.
    pub interrupted: bool,
}

pub(super) struct VirtualUser {
    pub(super) active: Arc<AtomicBool>,
    pub(super) handle: JoinHandle<AppResult<()>>,
}

async fn join_vu(vu: VirtualUser, first_error: &mut Option<AppError>) {
    let result = match vu.handle.await {
        Ok(result) => result,
        Err(err) => Err(AppError::from(err)),
    };
    if let Err(err) = result {
        first_error.get_or_insert(err);
    }
}

/// Join retired VUs that already stopped, keeping the ones still finishing
/// their last iteration.
pub(super) async fn prune_finished(
    retired: &mut Vec<VirtualUser>,
    first_error: &mut Option<AppError>,
) {
    let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(retired)
        .into_iter()
        .partition(|vu| vu.handle.is_finished());
    *retired = running;
    for vu in finished {
        join_vu(vu, first_error).await;
    }
}

struct VuShared<F> {
    body: F,
    metrics: Arc<MetricsRegistry>,
    iterations: AtomicU64,
    shutdown_tx: ShutdownSender,
}

fn spawn_vu<F, Fut>(id: usize, shared: &Arc<VuShared<F>>) -> VirtualUser
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    let active = Arc::new(AtomicBool::new(true));
    let shared = Arc::clone(shared);
    let vu_active = Arc::clone(&active);
    let mut shutdown_rx = shared.shutdown_tx.subscribe();
    let handle = tokio::spawn(async move {
        debug!("VU {} started", id);
        while vu_active.load(Ordering::Acquire) {
            let started = Instant::now();
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                result = (shared.body)() => {
                    if let Err(err) = result {
                        error!("VU {} aborted the scenario: {}", id, err);
                        drop(shared.shutdown_tx.send(()));
                        return Err(err);
                    }
                    shared.metrics.record_iteration(started.elapsed());
                    shared.iterations.fetch_add(1, Ordering::Relaxed);
                }
            }
            // Iterations that never wait on I/O must not starve the ticker.
            tokio::task::yield_now().await;
        }
        debug!("VU {} stopped", id);
        Ok(())
    });
    VirtualUser { active, handle }
}

/// Drive `body` on as many concurrent virtual users as `staging` asks for,
/// until the last stage ends or shutdown is signalled.
///
/// Retired VUs finish their current iteration; at the end every VU still
/// running is cancelled.
///
/// # Errors
///
/// Returns the first error produced by an iteration, which also stops every
/// other VU.
pub async fn run_vus<F, Fut>(
    staging: &Staging,
    shutdown_tx: &ShutdownSender,
    metrics: Arc<MetricsRegistry>,
    body: F,
) -> AppResult<RunnerStats>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    let shared = Arc::new(VuShared {
        body,
        metrics,
        iterations: AtomicU64::new(0),
        shutdown_tx: shutdown_tx.clone(),
    });
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let started = Instant::now();
    let mut active: Vec<VirtualUser> = Vec::new();
    let mut retired: Vec<VirtualUser> = Vec::new();
    let mut next_id: usize = 0;
    let mut stats = RunnerStats::default();
    let mut first_error: Option<AppError> = None;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                stats.interrupted = staging.target_at(started.elapsed()).is_some();
                break;
            }
            _ = ticker.tick() => {
                let Some(target) = staging.target_at(started.elapsed()) else {
                    break;
                };
                while active.len() < target {
                    next_id = next_id.saturating_add(1);
                    active.push(spawn_vu(next_id, &shared));
                }
                while active.len() > target {
                    if let Some(vu) = active.pop() {
                        vu.active.store(false, Ordering::Release);
                        retired.push(vu);
                    }
                }
                stats.peak_vus = stats.peak_vus.max(active.len());
                prune_finished(&mut retired, &mut first_error).await;
            }
        }
    }

    for vu in &active {
        vu.active.store(false, Ordering::Release);
    }
    drop(shutdown_tx.send(()));
    for vu in active.into_iter().chain(retired) {
        join_vu(vu, &mut first_error).await;
    }
    stats.iterations = shared.iterations.load(Ordering::Relaxed);

    match first_error {
        Some(err) => Err(err),
        None => Ok(stats),
    }
}
