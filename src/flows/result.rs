use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed,
    /// Not attempted because a prerequisite (usually the session token) was
    /// missing.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub label: &'static str,
    pub status: Option<u16>,
    pub outcome: StepOutcome,
}

impl StepResult {
    pub(crate) const fn checked(label: &'static str, status: u16, passed: bool) -> Self {
        Self {
            label,
            status: Some(status),
            outcome: if passed {
                StepOutcome::Passed
            } else {
                StepOutcome::Failed
            },
        }
    }

    pub(crate) const fn skipped(label: &'static str) -> Self {
        Self {
            label,
            status: None,
            outcome: StepOutcome::Skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowData {
    Auth {
        token: Option<String>,
        user: Option<Value>,
        teams: Option<Value>,
    },
    /// Item count per list endpoint that answered with a collection.
    Api {
        collections: BTreeMap<&'static str, usize>,
    },
    Pages,
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowResult {
    pub name: &'static str,
    pub success: bool,
    pub steps: Vec<StepResult>,
    pub data: FlowData,
}

impl FlowResult {
    /// Build a result whose success is derived from its steps.
    pub(crate) fn from_steps(name: &'static str, steps: Vec<StepResult>, data: FlowData) -> Self {
        let success = !steps.is_empty()
            && steps
                .iter()
                .all(|step| step.outcome == StepOutcome::Passed);
        Self {
            name,
            success,
            steps,
            data,
        }
    }

    #[must_use]
    pub const fn failed(name: &'static str, error: String) -> Self {
        Self {
            name,
            success: false,
            steps: Vec::new(),
            data: FlowData::Failed { error },
        }
    }

    /// Session token extracted by the authentication flow.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match &self.data {
            FlowData::Auth { token, .. } => token.as_deref(),
            FlowData::Api { .. } | FlowData::Pages | FlowData::Failed { .. } => None,
        }
    }
}

/// Turn a non-fatal flow error into a failed result. Fatal errors still
/// abort the scenario.
pub(crate) fn contain(name: &'static str, result: AppResult<FlowResult>) -> AppResult<FlowResult> {
    match result {
        Ok(flow) => Ok(flow),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            warn!("{} flow failed: {}", name, err);
            Ok(FlowResult::failed(name, err.to_string()))
        }
    }
}
