//! Protocol implementation
//!
//! Handles message framing, command parsing and validation, and dispatch.

pub mod codec;
pub mod commands;
pub mod handlers;
pub mod responses;

pub use codec::Connection;
pub use commands::{Command, Verb, parse_command};
pub use handlers::handle_command;
pub use responses::{CommandResult, CommandStatus, Response, Status};
