use std::fmt::Write as _;

use crate::error::SinkError;

pub(super) fn write_line(output: &mut String, line: &str) -> Result<(), SinkError> {
    writeln!(output, "{}", line).map_err(|err| SinkError::WriteLine { source: err })
}

/// Escape a measurement name or tag key/value for line protocol.
pub(super) fn escape_key(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, ',' | ' ' | '=' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Split `metric{name:tag}` into the metric and its `name` tag.
pub(super) fn split_submetric(key: &str) -> (&str, Option<&str>) {
    key.strip_suffix('}')
        .and_then(|rest| rest.split_once("{name:"))
        .map_or((key, None), |(metric, name)| (metric, Some(name)))
}
