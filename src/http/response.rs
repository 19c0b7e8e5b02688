use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Response payload, classified once when the response is received.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
    Empty,
    /// Looked like JSON but failed to parse.
    Unparsed { raw: String, error: String },
}

impl Body {
    pub(crate) fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Body::Empty;
        }
        let text = String::from_utf8_lossy(bytes).into_owned();
        let declared_json = content_type.is_some_and(|value| value.contains("json"));
        let looks_json = matches!(text.trim_start().chars().next(), Some('{' | '['));
        if !declared_json && !looks_json {
            return Body::Text(text);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(err) => {
                debug!("Response body is not valid JSON: {}", err);
                Body::Unparsed {
                    raw: text,
                    error: err.to_string(),
                }
            }
        }
    }

    /// Extract a typed shape from a JSON body.
    #[must_use]
    pub fn parse<T>(&self) -> Parsed<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Body::Json(value) => match T::deserialize(value) {
                Ok(parsed) => Parsed::Value(parsed),
                Err(err) => Parsed::Unparsed {
                    error: err.to_string(),
                },
            },
            Body::Empty => Parsed::Missing,
            Body::Text(_) => Parsed::Unparsed {
                error: "body is not JSON".to_owned(),
            },
            Body::Unparsed { error, .. } => Parsed::Unparsed {
                error: error.clone(),
            },
        }
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) | Body::Empty | Body::Unparsed { .. } => None,
        }
    }
}

/// Outcome of a typed body extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Missing,
    Unparsed { error: String },
}

impl<T> Parsed<T> {
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(value) => Some(value),
            Parsed::Missing | Parsed::Unparsed { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    /// `0` when no response was received.
    pub status: u16,
    pub duration: Duration,
    pub waiting: Duration,
    pub body: Body,
    /// Transport error, if the request never completed.
    pub error: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl HttpResponse {
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}
