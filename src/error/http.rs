use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Unsupported HTTP method '{method}'. Use GET, POST, PUT, PATCH, or DELETE.")]
    UnsupportedMethod { method: String },
    #[error("Failed to serialize request body for {url}: {source}")]
    SerializeBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Health check against {url} failed: {reason}")]
    SetupFailed { url: String, reason: String },
}
