//! Named backend and frontend routes plus URL classification helpers.
mod classify;
mod registry;


pub use classify::{RequestKind, classify_method, tag_for_url};
pub use registry::{Domain, Endpoint, EndpointRegistry};
