//! Post-run outputs: InfluxDB line protocol push and JSON summary export.
mod format;
mod influx;
mod json;


pub use influx::{influx_write_url, line_protocol, push_influx};
pub use json::export_json;
