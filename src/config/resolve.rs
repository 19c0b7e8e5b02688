use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::args::TesterArgs;
use crate::error::ConfigError;
use crate::metrics::ThresholdSet;

use super::defaults::{DEFAULT_OVERRIDE_DURATION, default_profiles};
use super::parse_duration_value;
use super::types::{
    Config, ConfigFile, Credentials, MetricsSinkConfig, RequestDefaults, ScenarioFileConfig,
    ScenarioKind, ScenarioProfile, Stage, Staging,
};

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("campaign-loadtest/", env!("CARGO_PKG_VERSION"));

impl Config {
    /// Build the run configuration from parsed arguments. Every value has a
    /// default, so resolution itself cannot fail.
    #[must_use]
    pub fn resolve(args: &TesterArgs) -> Self {
        let scenario = ScenarioKind::from_name(&args.scenario);

        let mut profiles = default_profiles();
        let selected = profiles.get_mut(scenario);
        if let Some(staging) = staging_override(args) {
            selected.staging = staging;
        }
        let thresholds = std::mem::take(&mut selected.thresholds);
        selected.thresholds = thresholds.with_abort_on_fail(args.abort_on_fail);

        let headers = BTreeMap::from([
            ("Accept".to_owned(), "application/json".to_owned()),
            ("User-Agent".to_owned(), DEFAULT_USER_AGENT.to_owned()),
        ]);
        let tags = BTreeMap::from([("scenario".to_owned(), scenario.as_str().to_owned())]);

        Self {
            base_url: trim_origin(&args.base_url),
            frontend_url: trim_origin(&args.frontend_url),
            credentials: Credentials {
                email: args.user_email.clone(),
                password: args.user_password.clone(),
            },
            metrics_sink: MetricsSinkConfig {
                enabled: args.influx,
                url: trim_origin(&args.influx_url),
                org: args.influx_org.clone(),
                bucket: args.influx_bucket.clone(),
                token: args.influx_token.clone(),
            },
            request_defaults: RequestDefaults {
                timeout: args.request_timeout,
                headers,
                tags,
            },
            scenario,
            abort_on_fail: args.abort_on_fail,
            summary_export: args.summary_export.as_ref().map(PathBuf::from),
            profiles,
        }
    }

    /// Apply scenario overrides from a config file, producing a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when a stage, duration, or threshold in the file is
    /// invalid.
    pub fn with_file(mut self, file: &ConfigFile) -> Result<Self, ConfigError> {
        let Some(scenarios) = file.scenarios.as_ref() else {
            return Ok(self);
        };
        for (name, overrides) in scenarios {
            let kind = ScenarioKind::from_name(name);
            let abort_on_fail = self.abort_on_fail && kind == self.scenario;
            apply_scenario_file(self.profiles.get_mut(kind), name, overrides, abort_on_fail)?;
        }
        Ok(self)
    }

    #[must_use]
    pub const fn profile_for(&self, kind: ScenarioKind) -> &ScenarioProfile {
        self.profiles.get(kind)
    }

    /// Profile for a scenario name; unknown names get the load profile.
    #[must_use]
    pub fn profile_for_name(&self, name: &str) -> &ScenarioProfile {
        self.profiles.get(ScenarioKind::from_name(name))
    }

    #[must_use]
    pub const fn thresholds_for(&self, kind: ScenarioKind) -> &ThresholdSet {
        &self.profiles.get(kind).thresholds
    }

    #[must_use]
    pub const fn staging_for(&self, kind: ScenarioKind) -> &Staging {
        &self.profiles.get(kind).staging
    }

    /// Profile of the scenario selected for this run.
    #[must_use]
    pub const fn active_profile(&self) -> &ScenarioProfile {
        self.profiles.get(self.scenario)
    }
}

fn staging_override(args: &TesterArgs) -> Option<Staging> {
    match (args.vus, args.duration) {
        (None, None) => None,
        (vus, duration) => Some(Staging::Constant {
            vus: vus.map_or(1, |vus| vus.get()),
            duration: duration.unwrap_or(DEFAULT_OVERRIDE_DURATION),
        }),
    }
}

fn trim_origin(value: &str) -> String {
    value.trim().trim_end_matches('/').to_owned()
}

fn apply_scenario_file(
    profile: &mut ScenarioProfile,
    name: &str,
    overrides: &ScenarioFileConfig,
    abort_on_fail: bool,
) -> Result<(), ConfigError> {
    if let Some(stages) = overrides.stages.as_ref() {
        if overrides.vus.is_some() || overrides.duration.is_some() {
            return Err(ConfigError::StagingConflict {
                scenario: name.to_owned(),
            });
        }
        if stages.is_empty() {
            return Err(ConfigError::EmptyStages {
                scenario: name.to_owned(),
            });
        }
        let parsed = stages
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                parse_duration_value(&stage.duration)
                    .map(|duration| Stage {
                        duration,
                        target: stage.target,
                    })
                    .map_err(|err| ConfigError::InvalidStage {
                        scenario: name.to_owned(),
                        index,
                        source: err,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        profile.staging = Staging::Ramping(parsed);
    } else if overrides.vus.is_some() || overrides.duration.is_some() {
        let duration = match overrides.duration.as_deref() {
            Some(value) => parse_duration_value(value).map_err(|err| {
                ConfigError::InvalidScenarioDuration {
                    scenario: name.to_owned(),
                    source: err,
                }
            })?,
            None => DEFAULT_OVERRIDE_DURATION,
        };
        profile.staging = Staging::Constant {
            vus: overrides.vus.unwrap_or(1),
            duration,
        };
    }

    if let Some(thresholds) = overrides.thresholds.as_ref() {
        let mut set = ThresholdSet::default();
        for (metric, expressions) in thresholds {
            set.insert(metric, expressions.as_slice())?;
        }
        profile.thresholds = set.with_abort_on_fail(abort_on_fail);
    }
    Ok(())
}
