use crate::{
    checks::check_response,
    endpoints::Endpoint,
    error::AppResult,
    http::RequestParams,
};

use super::result::contain;
use super::{FlowData, FlowResult, StepResult, THINK_TIME_PAGES, VuContext};

const FLOW: &str = "pages";

/// Protected pages may redirect to login or answer 401 when anonymous.
const PROTECTED_PAGE_STATUSES: &[u16] = &[200, 302, 307, 401];

const PAGES: [(&str, Endpoint, &[u16]); 6] = [
    ("home page", Endpoint::HomePage, &[200]),
    ("login page", Endpoint::LoginPage, &[200]),
    ("tasks page", Endpoint::TasksPage, PROTECTED_PAGE_STATUSES),
    ("campaigns page", Endpoint::CampaignsPage, PROTECTED_PAGE_STATUSES),
    ("projects page", Endpoint::ProjectsPage, PROTECTED_PAGE_STATUSES),
    ("metrics endpoint", Endpoint::MetricsPage, &[200]),
];

/// Load the frontend routes anonymously.
///
/// # Errors
///
/// Only fatal executor errors are returned.
pub async fn page_loads_flow(ctx: &VuContext) -> AppResult<FlowResult> {
    contain(FLOW, run(ctx).await)
}

async fn run(ctx: &VuContext) -> AppResult<FlowResult> {
    let mut steps = Vec::with_capacity(PAGES.len());
    for (index, (label, endpoint, expected)) in PAGES.into_iter().enumerate() {
        if index > 0 {
            ctx.pacing.pause(THINK_TIME_PAGES).await;
        }
        let mut params = RequestParams::new().tag("flow", FLOW).expect(expected);
        if endpoint != Endpoint::MetricsPage {
            params = params.header("Accept", "text/html,application/xhtml+xml");
        }
        let response = ctx
            .executor
            .get(&ctx.endpoints.url(endpoint), Some(&params))
            .await?;
        let valid = check_response(&ctx.checks, &response, expected, label);
        steps.push(StepResult::checked(label, response.status, valid));
    }
    Ok(FlowResult::from_steps(FLOW, steps, FlowData::Pages))
}
