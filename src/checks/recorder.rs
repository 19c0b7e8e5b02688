use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

use crate::metrics::MetricsRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckCounts {
    pub passes: u64,
    pub fails: u64,
}

/// Records checks without ever interrupting the caller. Every check also
/// feeds the `checks` rate metric.
#[derive(Debug)]
pub struct CheckRecorder {
    metrics: Arc<MetricsRegistry>,
    counts: Mutex<BTreeMap<String, CheckCounts>>,
}

impl CheckRecorder {
    #[must_use]
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            metrics,
            counts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record one check outcome and hand the outcome back.
    pub fn check(&self, name: &str, passed: bool) -> bool {
        {
            let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = counts.entry(name.to_owned()).or_default();
            if passed {
                entry.passes = entry.passes.saturating_add(1);
            } else {
                entry.fails = entry.fails.saturating_add(1);
            }
        }
        self.metrics.record_check(passed);
        if !passed {
            debug!("Check failed: {}", name);
        }
        passed
    }

    #[must_use]
    pub fn counts(&self, name: &str) -> CheckCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, CheckCounts> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
