//! Terminal client for the watch-party relay.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod input;
pub mod session;
mod ui;

pub use session::run_client_session;
