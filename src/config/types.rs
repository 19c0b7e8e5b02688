use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::ThresholdSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Smoke,
    Load,
    Stress,
    Spike,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Smoke,
        ScenarioKind::Load,
        ScenarioKind::Stress,
        ScenarioKind::Spike,
    ];

    /// Resolve a scenario name. Unknown names fall back to the load profile.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "smoke" => ScenarioKind::Smoke,
            "stress" => ScenarioKind::Stress,
            "spike" => ScenarioKind::Spike,
            _ => ScenarioKind::Load,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Smoke => "smoke",
            ScenarioKind::Load => "load",
            ScenarioKind::Stress => "stress",
            ScenarioKind::Spike => "spike",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: usize,
}

/// How many virtual users are active over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staging {
    /// Linear ramps between targets, starting from zero VUs.
    Ramping(Vec<Stage>),
    Constant { vus: usize, duration: Duration },
}

impl Staging {
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        match self {
            Staging::Ramping(stages) => stages
                .iter()
                .fold(Duration::ZERO, |acc, stage| acc.saturating_add(stage.duration)),
            Staging::Constant { duration, .. } => *duration,
        }
    }

    #[must_use]
    pub fn max_vus(&self) -> usize {
        match self {
            Staging::Ramping(stages) => stages.iter().map(|stage| stage.target).max().unwrap_or(0),
            Staging::Constant { vus, .. } => *vus,
        }
    }

    /// Target VU count `elapsed` into the run, or `None` once every stage has
    /// finished.
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> Option<usize> {
        match self {
            Staging::Constant { vus, duration } => (elapsed < *duration).then_some(*vus),
            Staging::Ramping(stages) => {
                let mut stage_start = Duration::ZERO;
                let mut from: usize = 0;
                for stage in stages {
                    let stage_end = stage_start.saturating_add(stage.duration);
                    if elapsed < stage_end {
                        let into_stage = elapsed.saturating_sub(stage_start);
                        return Some(interpolate(from, stage.target, into_stage, stage.duration));
                    }
                    from = stage.target;
                    stage_start = stage_end;
                }
                None
            }
        }
    }
}

fn interpolate(from: usize, to: usize, elapsed: Duration, span: Duration) -> usize {
    let span_ms = i128::try_from(span.as_millis()).unwrap_or(i128::MAX).max(1);
    let elapsed_ms = i128::try_from(elapsed.as_millis())
        .unwrap_or(i128::MAX)
        .min(span_ms);
    let start = i128::try_from(from).unwrap_or(i128::MAX);
    let end = i128::try_from(to).unwrap_or(i128::MAX);
    let step = end
        .saturating_sub(start)
        .saturating_mul(elapsed_ms)
        .checked_div(span_ms)
        .unwrap_or(0);
    usize::try_from(start.saturating_add(step).max(0)).unwrap_or(usize::MAX)
}

#[derive(Debug, Clone)]
pub struct ScenarioProfile {
    pub staging: Staging,
    pub thresholds: ThresholdSet,
}

/// One profile per scenario kind, so lookups are total.
#[derive(Debug, Clone)]
pub struct ScenarioProfiles {
    pub smoke: ScenarioProfile,
    pub load: ScenarioProfile,
    pub stress: ScenarioProfile,
    pub spike: ScenarioProfile,
}

impl ScenarioProfiles {
    #[must_use]
    pub const fn get(&self, kind: ScenarioKind) -> &ScenarioProfile {
        match kind {
            ScenarioKind::Smoke => &self.smoke,
            ScenarioKind::Load => &self.load,
            ScenarioKind::Stress => &self.stress,
            ScenarioKind::Spike => &self.spike,
        }
    }

    pub(crate) const fn get_mut(&mut self, kind: ScenarioKind) -> &mut ScenarioProfile {
        match kind {
            ScenarioKind::Smoke => &mut self.smoke,
            ScenarioKind::Load => &mut self.load,
            ScenarioKind::Stress => &mut self.stress,
            ScenarioKind::Spike => &mut self.spike,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct MetricsSinkConfig {
    pub enabled: bool,
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
}

/// Options applied to every request unless the caller overrides them.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub timeout: Duration,
    pub headers: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

/// Immutable run configuration, built once at startup and shared by
/// reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub frontend_url: String,
    pub credentials: Credentials,
    pub metrics_sink: MetricsSinkConfig,
    pub request_defaults: RequestDefaults,
    pub scenario: ScenarioKind,
    pub abort_on_fail: bool,
    pub summary_export: Option<PathBuf>,
    pub(crate) profiles: ScenarioProfiles,
}

/// Optional on-disk overrides for scenario stages and thresholds.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub scenarios: Option<BTreeMap<String, ScenarioFileConfig>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioFileConfig {
    pub stages: Option<Vec<StageFileConfig>>,
    pub vus: Option<usize>,
    pub duration: Option<String>,
    pub thresholds: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StageFileConfig {
    pub duration: String,
    pub target: usize,
}
