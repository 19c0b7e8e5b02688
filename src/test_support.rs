use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::args::TesterArgs;
use crate::checks::CheckRecorder;
use crate::config::{Config, ScenarioKind};
use crate::flows::{Pacing, VuContext};
use crate::http::{
    HttpMethod, OutgoingRequest, RawResponse, RequestExecutor, Transport, TransportFailure,
};
use crate::metrics::MetricsRegistry;
use crate::scenarios::{RunReport, RunnerStats};

pub(crate) fn base_args() -> TesterArgs {
    TesterArgs {
        base_url: "http://api.local/".to_owned(),
        frontend_url: "http://web.local".to_owned(),
        user_email: "vu@example.com".to_owned(),
        user_password: "secret".to_owned(),
        scenario: "smoke".to_owned(),
        abort_on_fail: false,
        request_timeout: Duration::from_secs(30),
        vus: None,
        duration: None,
        influx: false,
        influx_url: "http://influx.local:8086".to_owned(),
        influx_org: "campaign".to_owned(),
        influx_bucket: "k6".to_owned(),
        influx_token: String::new(),
        summary_export: None,
        config: None,
        verbose: false,
        no_color: true,
    }
}

pub(crate) fn base_config() -> Config {
    Config::resolve(&base_args())
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: Vec<u8>,
    },
    Fail(String),
}

/// In-memory transport answering from a script keyed by method and URL.
/// Unscripted requests get an empty `200`.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    script: Mutex<HashMap<(HttpMethod, String), Scripted>>,
    calls: Mutex<Vec<OutgoingRequest>>,
    duration: Mutex<Duration>,
    delay: Mutex<Duration>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn insert(&self, method: HttpMethod, url: &str, entry: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, url.to_owned()), entry);
    }

    pub(crate) fn json(&self, method: HttpMethod, url: &str, status: u16, body: &Value) {
        self.insert(
            method,
            url,
            Scripted::Respond {
                status,
                content_type: Some("application/json"),
                body: body.to_string().into_bytes(),
            },
        );
    }

    pub(crate) fn text(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.insert(
            method,
            url,
            Scripted::Respond {
                status,
                content_type: Some("text/plain"),
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub(crate) fn status(&self, method: HttpMethod, url: &str, status: u16) {
        self.insert(
            method,
            url,
            Scripted::Respond {
                status,
                content_type: None,
                body: Vec::new(),
            },
        );
    }

    pub(crate) fn fail(&self, method: HttpMethod, url: &str, message: &str) {
        self.insert(method, url, Scripted::Fail(message.to_owned()));
    }

    /// Reported duration for every response, without sleeping.
    pub(crate) fn set_duration(&self, duration: Duration) {
        *self.duration.lock().unwrap_or_else(PoisonError::into_inner) = duration;
    }

    /// Real wall-clock latency added to every call.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    pub(crate) fn calls(&self) -> Vec<OutgoingRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        let key = (request.method, request.url.clone());
        let entry = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        let duration = *self.duration.lock().unwrap_or_else(PoisonError::into_inner);
        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match entry {
            Some(Scripted::Fail(message)) => Err(TransportFailure {
                message,
                elapsed: duration,
            }),
            Some(Scripted::Respond {
                status,
                content_type,
                body,
            }) => Ok(RawResponse {
                status,
                content_type: content_type.map(str::to_owned),
                body,
                duration,
                waiting: duration,
            }),
            None => Ok(RawResponse {
                status: 200,
                content_type: None,
                body: Vec::new(),
                duration,
                waiting: duration,
            }),
        }
    }
}

pub(crate) fn mock_executor(
    transport: &Arc<MockTransport>,
    config: &Config,
) -> (RequestExecutor, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    let executor = RequestExecutor::new(
        transport.clone(),
        config.request_defaults.clone(),
        metrics.clone(),
    );
    (executor, metrics)
}

pub(crate) fn mock_context(transport: &Arc<MockTransport>) -> (VuContext, Arc<MetricsRegistry>) {
    let config = Arc::new(base_config());
    let (executor, metrics) = mock_executor(transport, &config);
    let checks = Arc::new(CheckRecorder::new(metrics.clone()));
    let ctx = VuContext::new(config, executor, checks, Pacing::none());
    (ctx, metrics)
}

pub(crate) fn sample_report(kind: ScenarioKind) -> RunReport {
    RunReport {
        scenario: kind,
        started_at: Utc::now(),
        elapsed: Duration::from_secs(2),
        stats: RunnerStats {
            iterations: 4,
            peak_vus: 1,
            interrupted: false,
        },
    }
}
