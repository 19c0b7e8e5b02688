use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    checks::check_response,
    endpoints::Endpoint,
    error::AppResult,
    http::{Parsed, RequestParams},
};

use super::result::contain;
use super::{FlowData, FlowResult, StepResult, THINK_TIME_AUTH, VuContext};

const FLOW: &str = "auth";

/// Shape of a successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

/// Log in with the configured test user, then fetch the profile and teams
/// with the issued token.
///
/// A login that is not `200` or carries no token fails the flow and skips
/// the authenticated steps.
///
/// # Errors
///
/// Only fatal executor errors are returned.
pub async fn login_flow(ctx: &VuContext) -> AppResult<FlowResult> {
    contain(FLOW, run(ctx).await)
}

async fn run(ctx: &VuContext) -> AppResult<FlowResult> {
    let credentials = &ctx.config.credentials;
    let payload = json!({
        "email": credentials.email,
        "password": credentials.password,
    });
    let params = RequestParams::new().tag("flow", FLOW).expect(&[200]);
    let response = ctx
        .executor
        .post(&ctx.endpoints.url(Endpoint::Login), Some(&payload), Some(&params))
        .await?;

    let status_ok = check_response(&ctx.checks, &response, &[200], "login");
    let login = match response.body.parse::<LoginBody>() {
        Parsed::Value(login) => Some(login),
        Parsed::Missing => None,
        Parsed::Unparsed { error } => {
            warn!("Login response could not be parsed: {}", error);
            None
        }
    };
    let token = login
        .as_ref()
        .and_then(|login| login.token.clone())
        .filter(|token| !token.is_empty());
    let has_token = ctx.checks.check("login has token", token.is_some());
    let mut steps = vec![StepResult::checked(
        "login",
        response.status,
        status_ok && has_token,
    )];

    let Some(token) = token.filter(|_| status_ok) else {
        warn!(
            "Login failed for {} with status {}",
            credentials.email, response.status
        );
        steps.push(StepResult::skipped("profile"));
        steps.push(StepResult::skipped("teams"));
        return Ok(FlowResult::from_steps(
            FLOW,
            steps,
            FlowData::Auth {
                token: None,
                user: None,
                teams: None,
            },
        ));
    };
    let login_user = login.and_then(|login| login.user);

    ctx.pacing.pause(THINK_TIME_AUTH).await;
    let params = RequestParams::new()
        .tag("flow", FLOW)
        .bearer(&token)
        .expect(&[200]);
    let profile = ctx
        .executor
        .get(&ctx.endpoints.url(Endpoint::Me), Some(&params))
        .await?;
    let profile_ok = check_response(&ctx.checks, &profile, &[200], "profile");
    steps.push(StepResult::checked("profile", profile.status, profile_ok));
    let user = profile
        .body
        .as_json()
        .filter(|_| profile_ok)
        .cloned()
        .or(login_user);

    ctx.pacing.pause(THINK_TIME_AUTH).await;
    let params = params.expect(&[200, 404]);
    let teams_response = ctx
        .executor
        .get(&ctx.endpoints.url(Endpoint::MyTeams), Some(&params))
        .await?;
    let teams_ok = check_response(&ctx.checks, &teams_response, &[200, 404], "teams");
    steps.push(StepResult::checked("teams", teams_response.status, teams_ok));
    let teams = if teams_response.status == 200 {
        teams_response.body.as_json().cloned()
    } else {
        debug!("User has no teams (status {})", teams_response.status);
        None
    };

    Ok(FlowResult::from_steps(
        FLOW,
        steps,
        FlowData::Auth {
            token: Some(token),
            user,
            teams,
        },
    ))
}
