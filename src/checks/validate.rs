use std::time::Duration;

use crate::http::HttpResponse;

use super::CheckRecorder;

/// Latency bound recorded alongside every status check.
pub const LATENCY_BUDGET: Duration = Duration::from_secs(5);

/// Record one `"{label} status is {code}"` check per acceptable status and a
/// `"{label} duration < 5s"` check.
///
/// Returns whether the status is acceptable. The latency check is recorded
/// but does not affect the return value.
pub fn check_response(
    recorder: &CheckRecorder,
    response: &HttpResponse,
    expected: &[u16],
    label: &str,
) -> bool {
    for code in expected {
        recorder.check(
            &format!("{} status is {}", label, code),
            response.status == *code,
        );
    }
    recorder.check(
        &format!("{} duration < 5s", label),
        response.duration < LATENCY_BUDGET,
    );
    expected.contains(&response.status)
}
