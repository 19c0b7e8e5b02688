//! Configuration resolution: environment/CLI values, scenario profiles, and
//! optional file overrides.
mod defaults;
mod loader;
mod parse;
mod resolve;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{load_config, load_config_file};
pub(crate) use parse::parse_duration_value;
pub use types::{
    Config, Credentials, MetricsSinkConfig, RequestDefaults, ScenarioKind, ScenarioProfile,
    ScenarioProfiles, Stage, Staging,
};
