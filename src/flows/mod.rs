//! Multi-step user flows built from tagged requests and checks.
mod api;
mod auth;
mod context;
mod pages;
mod result;


use std::time::Duration;

pub use api::endpoints_flow;
pub use auth::{LoginBody, login_flow};
pub use context::{Pacing, VuContext};
pub use pages::page_loads_flow;
pub use result::{FlowData, FlowResult, StepOutcome, StepResult};

/// Pause between authentication steps.
pub const THINK_TIME_AUTH: Duration = Duration::from_secs(1);
/// Pause between API list calls.
pub const THINK_TIME_API: Duration = Duration::from_millis(500);
/// Pause between page loads.
pub const THINK_TIME_PAGES: Duration = Duration::from_secs(1);
