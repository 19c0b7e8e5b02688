use std::sync::Arc;
use std::time::Duration;

use crate::checks::CheckRecorder;
use crate::config::Config;
use crate::endpoints::EndpointRegistry;
use crate::http::RequestExecutor;

/// Whether think-time pauses actually sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    enabled: bool,
}

impl Pacing {
    #[must_use]
    pub const fn human() -> Self {
        Self { enabled: true }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self { enabled: false }
    }

    pub async fn pause(self, duration: Duration) {
        if self.enabled && !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Everything one virtual user needs to run an iteration. Cheap to clone.
#[derive(Debug, Clone)]
pub struct VuContext {
    pub config: Arc<Config>,
    pub endpoints: Arc<EndpointRegistry>,
    pub executor: RequestExecutor,
    pub checks: Arc<CheckRecorder>,
    pub pacing: Pacing,
}

impl VuContext {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        executor: RequestExecutor,
        checks: Arc<CheckRecorder>,
        pacing: Pacing,
    ) -> Self {
        let endpoints = Arc::new(EndpointRegistry::new(&config));
        Self {
            config,
            endpoints,
            executor,
            checks,
            pacing,
        }
    }
}
