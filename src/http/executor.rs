use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::RequestDefaults,
    endpoints::{classify_method, tag_for_url},
    error::{AppResult, HttpError},
    metrics::{MetricsRegistry, RequestSample},
};

use super::response::{Body, HttpResponse};
use super::transport::{OutgoingRequest, Transport};
use super::HttpMethod;

/// Per-call overrides layered on top of the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub headers: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    /// Statuses counted as successful for `http_req_failed`. Empty means any
    /// status below 400.
    pub expected_statuses: Vec<u16>,
}

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    #[must_use]
    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn expect(mut self, statuses: &[u16]) -> Self {
        self.expected_statuses = statuses.to_vec();
        self
    }

    fn counts_as_failed(&self, status: u16) -> bool {
        if status == 0 {
            return true;
        }
        if self.expected_statuses.is_empty() {
            return status >= 400;
        }
        !self.expected_statuses.contains(&status)
    }
}

/// Issues exactly one tagged request per call and feeds the metric pipeline.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    defaults: Arc<RequestDefaults>,
    metrics: Arc<MetricsRegistry>,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        defaults: RequestDefaults,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            transport,
            defaults: Arc::new(defaults),
            metrics,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Send one request.
    ///
    /// Transport failures are reported as status `0` with `error` set.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::UnsupportedMethod`] for anything other than
    /// GET/POST/PUT/PATCH/DELETE, before any I/O, and
    /// [`HttpError::SerializeBody`] when the body cannot be encoded.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
        params: Option<&RequestParams>,
    ) -> AppResult<HttpResponse> {
        let method: HttpMethod = method.parse()?;
        let default_params = RequestParams::default();
        let params = params.unwrap_or(&default_params);

        let tags = self.merge_tags(method, url, params);
        let mut headers = self.defaults.headers.clone();
        headers.extend(params.headers.clone());

        let body_bytes = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|source| HttpError::SerializeBody {
                url: url.to_owned(),
                source,
            })?;
        if body_bytes.is_some()
            && !headers
                .keys()
                .any(|key| key.eq_ignore_ascii_case("content-type"))
        {
            headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        }

        let outgoing = OutgoingRequest {
            method,
            url: url.to_owned(),
            headers: headers.into_iter().collect(),
            body: body_bytes,
            timeout: params.timeout.unwrap_or(self.defaults.timeout),
        };

        let response = match self.transport.send(outgoing).await {
            Ok(raw) => HttpResponse {
                url: url.to_owned(),
                status: raw.status,
                duration: raw.duration,
                waiting: raw.waiting,
                body: Body::from_bytes(raw.content_type.as_deref(), &raw.body),
                error: None,
                tags,
            },
            Err(failure) => {
                warn!("{} {} failed: {}", method, url, failure.message);
                HttpResponse {
                    url: url.to_owned(),
                    status: 0,
                    duration: failure.elapsed,
                    waiting: Duration::ZERO,
                    body: Body::Empty,
                    error: Some(failure.message),
                    tags,
                }
            }
        };

        let failed = params.counts_as_failed(response.status);
        self.metrics.record_request(&RequestSample {
            name: response.tag("name").unwrap_or_default().to_owned(),
            duration: response.duration,
            waiting: response.waiting,
            failed,
        });
        debug!(
            "{} {} -> {} in {}ms",
            method,
            url,
            response.status,
            response.duration.as_millis()
        );
        Ok(response)
    }

    /// Defaults < caller tags < computed `method`/`endpoint`/`type`. The
    /// `name` tag is only computed when nobody set it.
    fn merge_tags(
        &self,
        method: HttpMethod,
        url: &str,
        params: &RequestParams,
    ) -> BTreeMap<String, String> {
        let endpoint = tag_for_url(url);
        let mut tags = self.defaults.tags.clone();
        tags.extend(params.tags.clone());
        tags.entry("name".to_owned()).or_insert_with(|| {
            format!(
                "{}_{}",
                endpoint,
                method.as_str().to_ascii_lowercase()
            )
        });
        tags.insert("method".to_owned(), method.as_str().to_owned());
        tags.insert(
            "type".to_owned(),
            classify_method(method.as_str()).as_str().to_owned(),
        );
        tags.insert("endpoint".to_owned(), endpoint);
        tags
    }

    /// # Errors
    ///
    /// See [`RequestExecutor::request`].
    pub async fn get(&self, url: &str, params: Option<&RequestParams>) -> AppResult<HttpResponse> {
        self.request(HttpMethod::Get.as_str(), url, None, params)
            .await
    }

    /// # Errors
    ///
    /// See [`RequestExecutor::request`].
    pub async fn post(
        &self,
        url: &str,
        body: Option<&Value>,
        params: Option<&RequestParams>,
    ) -> AppResult<HttpResponse> {
        self.request(HttpMethod::Post.as_str(), url, body, params)
            .await
    }

    /// # Errors
    ///
    /// See [`RequestExecutor::request`].
    pub async fn put(
        &self,
        url: &str,
        body: Option<&Value>,
        params: Option<&RequestParams>,
    ) -> AppResult<HttpResponse> {
        self.request(HttpMethod::Put.as_str(), url, body, params)
            .await
    }

    /// # Errors
    ///
    /// See [`RequestExecutor::request`].
    pub async fn patch(
        &self,
        url: &str,
        body: Option<&Value>,
        params: Option<&RequestParams>,
    ) -> AppResult<HttpResponse> {
        self.request(HttpMethod::Patch.as_str(), url, body, params)
            .await
    }

    /// # Errors
    ///
    /// See [`RequestExecutor::request`].
    pub async fn delete(
        &self,
        url: &str,
        params: Option<&RequestParams>,
    ) -> AppResult<HttpResponse> {
        self.request(HttpMethod::Delete.as_str(), url, None, params)
            .await
    }
}
