//! Core library for the `campaign-loadtest` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration resolution, the endpoint registry, request
//! execution, response checks, user flows, scenario drivers, metrics
//! aggregation with thresholds, and output sinks. The primary user-facing
//! interface is the `campaign-loadtest` command-line application; library
//! APIs may evolve as the CLI grows.
pub mod args;
pub mod checks;
pub mod config;
pub mod endpoints;
pub mod entry;
pub mod error;
pub mod flows;
pub mod http;
pub mod metrics;
pub mod scenarios;
pub mod shutdown;
pub mod sinks;
pub mod summary;
mod system;

#[cfg(test)]
pub(crate) mod test_support;
