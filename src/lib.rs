//! Milo Relay - a small HTTP relay for a child-safe chat buddy
//!
//! Prompts arriving on the guided route are wrapped in a fixed persona
//! message and forwarded to an Azure OpenAI chat completions deployment; the
//! raw route forwards caller payloads untouched. Every failure is normalized
//! into a JSON `{ error, details? }` body.

pub mod application;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod proxy;

pub use application::Application;
pub use error::{Error, Result};
