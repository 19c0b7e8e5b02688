use std::time::Duration;

use rand::{Rng, thread_rng};
use tracing::debug;

use crate::{
    checks::check_response,
    config::ScenarioKind,
    endpoints::Endpoint,
    error::AppResult,
    flows::{FlowResult, VuContext, endpoints_flow, login_flow, page_loads_flow},
    http::RequestParams,
};

const SMOKE_PAUSE: Duration = Duration::from_secs(1);
const SPIKE_PAUSE: Duration = Duration::from_millis(500);
const LOAD_PAUSE_MS: (u64, u64) = (1_000, 3_000);
const STRESS_PAUSE_MS: (u64, u64) = (500, 1_500);

/// Flows run by one iteration, in order.
#[derive(Debug, Clone, Default)]
pub struct IterationResult {
    pub flows: Vec<FlowResult>,
}

impl IterationResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.flows.iter().all(|flow| flow.success)
    }
}

/// Run one iteration of the given scenario's body.
///
/// # Errors
///
/// Returns only fatal errors; flow failures are part of the result.
pub async fn run_iteration(kind: ScenarioKind, ctx: &VuContext) -> AppResult<IterationResult> {
    let result = match kind {
        ScenarioKind::Smoke => smoke(ctx).await?,
        ScenarioKind::Load => load(ctx).await?,
        ScenarioKind::Stress => stress(ctx).await?,
        ScenarioKind::Spike => spike(ctx).await?,
    };
    if !result.success() {
        let failed: Vec<&str> = result
            .flows
            .iter()
            .filter(|flow| !flow.success)
            .map(|flow| flow.name)
            .collect();
        debug!("{} iteration had failing flows: {:?}", kind, failed);
    }
    Ok(result)
}

async fn smoke(ctx: &VuContext) -> AppResult<IterationResult> {
    let mut flows = Vec::with_capacity(3);
    let auth = login_flow(ctx).await?;
    let token = auth.token().map(str::to_owned);
    flows.push(auth);
    if let Some(token) = token.as_deref() {
        flows.push(endpoints_flow(ctx, Some(token)).await?);
    }
    flows.push(page_loads_flow(ctx).await?);
    ctx.pacing.pause(SMOKE_PAUSE).await;
    Ok(IterationResult { flows })
}

async fn load(ctx: &VuContext) -> AppResult<IterationResult> {
    let auth = login_flow(ctx).await?;
    let token = auth.token().map(str::to_owned);
    let api = endpoints_flow(ctx, token.as_deref()).await?;
    let pages = page_loads_flow(ctx).await?;
    let pause = random_pause(LOAD_PAUSE_MS);
    ctx.pacing.pause(pause).await;
    Ok(IterationResult {
        flows: vec![auth, api, pages],
    })
}

async fn stress(ctx: &VuContext) -> AppResult<IterationResult> {
    let auth = login_flow(ctx).await?;
    let token = auth.token().map(str::to_owned);
    let api = endpoints_flow(ctx, token.as_deref()).await?;
    let pause = random_pause(STRESS_PAUSE_MS);
    ctx.pacing.pause(pause).await;
    Ok(IterationResult {
        flows: vec![auth, api],
    })
}

async fn spike(ctx: &VuContext) -> AppResult<IterationResult> {
    let params = RequestParams::new().tag("flow", "spike").expect(&[200]);
    let health = ctx
        .executor
        .get(&ctx.endpoints.url(Endpoint::Health), Some(&params))
        .await?;
    check_response(&ctx.checks, &health, &[200], "spike health");

    let auth = login_flow(ctx).await?;
    let token = auth.token().map(str::to_owned);
    let api = endpoints_flow(ctx, token.as_deref()).await?;
    ctx.pacing.pause(SPIKE_PAUSE).await;
    Ok(IterationResult {
        flows: vec![auth, api],
    })
}

fn random_pause((min_ms, max_ms): (u64, u64)) -> Duration {
    let mut rng = thread_rng();
    Duration::from_millis(rng.gen_range(min_ms..=max_ms))
}
