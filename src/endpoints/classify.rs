use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Read,
    Write,
}

impl RequestKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestKind::Read => "read",
            RequestKind::Write => "write",
        }
    }
}

/// Classify a method name. Anything unrecognised is treated as a read.
#[must_use]
pub fn classify_method(method: &str) -> RequestKind {
    match method.trim().to_ascii_uppercase().as_str() {
        "POST" | "PUT" | "PATCH" | "DELETE" => RequestKind::Write,
        _ => RequestKind::Read,
    }
}

/// Short resource tag for a URL: the last non-numeric path segment, with a
/// `_detail` suffix when the URL ends in a numeric id.
#[must_use]
pub fn tag_for_url(url: &str) -> String {
    const UNKNOWN: &str = "unknown";

    let Ok(parsed) = Url::parse(url) else {
        return UNKNOWN.to_owned();
    };
    let Some(segments) = parsed.path_segments() else {
        return UNKNOWN.to_owned();
    };
    let segments: Vec<&str> = segments.filter(|segment| !segment.is_empty()).collect();
    let Some(last) = segments.last() else {
        return UNKNOWN.to_owned();
    };

    let is_numeric = |segment: &&str| segment.chars().all(|ch| ch.is_ascii_digit());
    let resource = segments.iter().rev().find(|segment| !is_numeric(segment));
    match resource {
        Some(resource) if is_numeric(last) => format!("{}_detail", resource),
        Some(resource) => (*resource).to_owned(),
        None => UNKNOWN.to_owned(),
    }
}
