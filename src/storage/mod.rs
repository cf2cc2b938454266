//! File system storage management
//!
//! Handles path containment, filesystem metadata and file operations.

pub mod filesystem;
pub mod operations;
pub mod validation;

pub use filesystem::{FsMetadata, LocalFs};
pub use operations::{delete_file, prepare_rename, rename_file};
pub use validation::{resolve_file_path, resolve_virtual, virtual_to_real_path};
