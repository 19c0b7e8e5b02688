use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, header::CONTENT_TYPE, redirect};
use tokio::time::Instant;

use crate::error::HttpError;

use super::HttpMethod;

/// Maximum redirects followed by the production transport.
const REDIRECT_LIMIT: usize = 10;

/// A fully merged request, ready to hit the wire.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Time until the full body was read.
    pub duration: Duration,
    /// Time until response headers arrived.
    pub waiting: Duration,
}

/// The request never produced a response (connect error, timeout, reset).
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub message: String,
    pub elapsed: Duration,
}

#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build the shared connection-pooling client.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, HttpError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
            .build()
            .map_err(|source| HttpError::BuildClientFailed { source })?;
        Ok(Self { client })
    }
}

fn failure(err: &reqwest::Error, started: Instant) -> TransportFailure {
    TransportFailure {
        message: err.to_string(),
        elapsed: started.elapsed(),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        let started = Instant::now();
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &request.url)
            .timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| failure(&err, started))?;
        let waiting = started.elapsed();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|err| failure(&err, started))?;
            body.extend_from_slice(&bytes);
        }

        Ok(RawResponse {
            status,
            content_type,
            body,
            duration: started.elapsed(),
            waiting,
        })
    }
}
