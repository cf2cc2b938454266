//! Transfer module
//!
//! Implements STOR and RETR over the shared control/data stream, honouring
//! the session's transmission mode.

pub mod file_ops;
pub mod intent;
pub mod modes;
pub mod operations;

pub use intent::{StoreMode, StoreOperation, TransferIntent, generation_name};
pub use modes::TransmissionMode;
pub use operations::{handle_retr, handle_stor};
