//! Server core functionality
//!
//! The accept loop and the read-only context shared by all sessions.

pub mod context;
pub mod core;

pub use context::ServerContext;
pub use core::Server;
