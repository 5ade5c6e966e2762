//! HTTP surface of the relay
//!
//! Routes, middleware and the mapping from forwarder failures to the
//! `{ error, details? }` response contract.

pub mod error_response;
pub mod headers;
pub mod middleware;
pub mod middleware_stack;
pub mod service;


pub use error_response::{ErrorResponse, ErrorResponseExt, Route};
pub use service::{RelayService, RelayState};
