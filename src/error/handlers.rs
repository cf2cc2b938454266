//! Error handlers
//!
//! Logs session errors at a level matching their severity.

use log::{error, warn};

use crate::error::types::SessionError;

/// Log a session error on behalf of `peer`.
pub fn log_session_error(peer: &str, err: &SessionError) {
    if err.is_fatal() {
        error!("Session {peer} terminated: {err}");
    } else {
        warn!("Session {peer} rejected request: {err}");
    }
}
