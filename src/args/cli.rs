use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_bool_env, parse_duration_arg, parse_positive_usize};
use super::types::PositiveUsize;

/// Default backend API origin.
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default frontend origin.
pub(crate) const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub(crate) const DEFAULT_TEST_USER_EMAIL: &str = "loadtest@example.com";
pub(crate) const DEFAULT_TEST_USER_PASSWORD: &str = "loadtest123";
pub(crate) const DEFAULT_INFLUXDB_URL: &str = "http://localhost:8086";
pub(crate) const DEFAULT_INFLUXDB_ORG: &str = "campaign";
pub(crate) const DEFAULT_INFLUXDB_BUCKET: &str = "k6";

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Load-test harness for the campaign platform - staged virtual users running login, API, and page-load flows with checks and thresholds."
)]
pub struct TesterArgs {
    /// Backend API origin
    #[arg(long = "base-url", env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Frontend origin
    #[arg(long = "frontend-url", env = "FRONTEND_URL", default_value = DEFAULT_FRONTEND_URL)]
    pub frontend_url: String,

    /// Email of the test user used by the login flow
    #[arg(long = "user-email", env = "TEST_USER_EMAIL", default_value = DEFAULT_TEST_USER_EMAIL)]
    pub user_email: String,

    /// Password of the test user used by the login flow
    #[arg(
        long = "user-password",
        env = "TEST_USER_PASSWORD",
        default_value = DEFAULT_TEST_USER_PASSWORD,
        hide_env_values = true
    )]
    pub user_password: String,

    /// Scenario to run (smoke, load, stress, spike); unknown names run the load profile
    #[arg(long, short = 's', env = "SCENARIO", default_value = "smoke")]
    pub scenario: String,

    /// Treat breached thresholds as a failed run (non-zero exit)
    #[arg(long = "abort-on-fail", env = "ABORT_ON_FAIL", value_parser = parse_bool_env)]
    pub abort_on_fail: bool,

    /// Default request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        env = "REQUEST_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Run a constant number of virtual users instead of the scenario stages
    #[arg(long, env = "VUS", value_parser = parse_positive_usize)]
    pub vus: Option<PositiveUsize>,

    /// Run for a fixed duration instead of the scenario stages (supports ms/s/m/h)
    #[arg(long, env = "DURATION", value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Push the run summary to InfluxDB when the run finishes
    #[arg(long = "influx", env = "INFLUXDB_ENABLED", value_parser = parse_bool_env)]
    pub influx: bool,

    /// InfluxDB origin
    #[arg(long = "influx-url", env = "INFLUXDB_URL", default_value = DEFAULT_INFLUXDB_URL)]
    pub influx_url: String,

    /// InfluxDB organisation
    #[arg(long = "influx-org", env = "INFLUXDB_ORG", default_value = DEFAULT_INFLUXDB_ORG)]
    pub influx_org: String,

    /// InfluxDB bucket
    #[arg(long = "influx-bucket", env = "INFLUXDB_BUCKET", default_value = DEFAULT_INFLUXDB_BUCKET)]
    pub influx_bucket: String,

    /// InfluxDB API token
    #[arg(
        long = "influx-token",
        env = "INFLUXDB_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    pub influx_token: String,

    /// Write the end-of-run summary as JSON to this path
    #[arg(long = "summary-export", env = "SUMMARY_EXPORT")]
    pub summary_export: Option<String>,

    /// Path to a TOML/JSON file overriding scenario stages and thresholds
    #[arg(long, short = 'c', env = "LOADTEST_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADTEST_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
