//! Named pass/fail checks and response validation.
mod recorder;
mod validate;


pub use recorder::{CheckCounts, CheckRecorder};
pub use validate::{LATENCY_BUDGET, check_response};
