use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    checks::check_response,
    endpoints::Endpoint,
    error::AppResult,
    http::{Body, RequestParams},
};

use super::result::contain;
use super::{FlowData, FlowResult, StepResult, THINK_TIME_API, VuContext};

const FLOW: &str = "api";

/// Authenticated list endpoints. `404` means the collection is empty.
const LIST_ENDPOINTS: [(&str, Endpoint); 4] = [
    ("tasks", Endpoint::TasksList),
    ("campaigns", Endpoint::CampaignsList),
    ("projects", Endpoint::ProjectsList),
    ("assets", Endpoint::AssetsList),
];

const LIST_STATUSES: &[u16] = &[200, 404];

/// Hit the health check, then every list endpoint with the session token.
///
/// Without a token only the health check runs and the flow fails.
///
/// # Errors
///
/// Only fatal executor errors are returned.
pub async fn endpoints_flow(ctx: &VuContext, token: Option<&str>) -> AppResult<FlowResult> {
    contain(FLOW, run(ctx, token).await)
}

async fn run(ctx: &VuContext, token: Option<&str>) -> AppResult<FlowResult> {
    let mut steps = Vec::with_capacity(LIST_ENDPOINTS.len().saturating_add(1));
    let mut collections = BTreeMap::new();

    let params = RequestParams::new().tag("flow", FLOW).expect(&[200]);
    let health = ctx
        .executor
        .get(&ctx.endpoints.url(Endpoint::Health), Some(&params))
        .await?;
    let health_ok = check_response(&ctx.checks, &health, &[200], "health");
    steps.push(StepResult::checked("health", health.status, health_ok));

    let Some(token) = token else {
        debug!("No session token, skipping authenticated API calls");
        steps.extend(
            LIST_ENDPOINTS
                .iter()
                .map(|(label, _)| StepResult::skipped(*label)),
        );
        return Ok(FlowResult::from_steps(
            FLOW,
            steps,
            FlowData::Api { collections },
        ));
    };

    let params = RequestParams::new()
        .tag("flow", FLOW)
        .bearer(token)
        .expect(LIST_STATUSES);
    for (label, endpoint) in LIST_ENDPOINTS {
        ctx.pacing.pause(THINK_TIME_API).await;
        let response = ctx
            .executor
            .get(&ctx.endpoints.url(endpoint), Some(&params))
            .await?;
        let valid = check_response(&ctx.checks, &response, LIST_STATUSES, label);
        steps.push(StepResult::checked(label, response.status, valid));
        if let Some(count) = collection_len(&response.body) {
            collections.insert(label, count);
        }
    }

    Ok(FlowResult::from_steps(
        FLOW,
        steps,
        FlowData::Api { collections },
    ))
}

/// Items in a bare JSON array or a paginated `{"results": [...]}` page.
fn collection_len(body: &Body) -> Option<usize> {
    let value = body.as_json()?;
    value
        .as_array()
        .or_else(|| value.get("results").and_then(|results| results.as_array()))
        .map(Vec::len)
}
