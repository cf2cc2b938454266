//! Navigate module
//!
//! Handles directory navigation for clients: resolving CDIR targets and
//! rendering LIST output.

mod listing;
mod operations;

pub use listing::{ListFormat, list_directory};
pub use operations::{resolve_directory, resolve_subdirectory};
