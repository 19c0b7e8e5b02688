//! Tagged HTTP request execution over a pluggable transport.
mod executor;
mod method;
mod response;
mod transport;


pub use executor::{RequestExecutor, RequestParams};
pub use method::HttpMethod;
pub use response::{Body, HttpResponse, Parsed};
pub use transport::{OutgoingRequest, RawResponse, ReqwestTransport, Transport, TransportFailure};
