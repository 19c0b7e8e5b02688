//! Scenario drivers: setup, staged virtual users, teardown.
mod bodies;
mod driver;
mod runner;


pub use bodies::{IterationResult, run_iteration};
pub use driver::{DriverState, RunReport, SETUP_TIMEOUT, ScenarioDriver};
pub use runner::{RunnerStats, TICK_INTERVAL, run_vus};
