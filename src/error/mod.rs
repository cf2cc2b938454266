//! Error handling
//!
//! Defines error types and handling for the server.

pub mod handlers;
pub mod types;

pub use handlers::log_session_error;
pub use types::*;
