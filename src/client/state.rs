//! Module `state`
//!
//! Per-connection session state: authentication, working directory,
//! transmission mode and transfer accounting.

use crate::auth::Authenticator;
use crate::transfer::TransmissionMode;

/// Totals reported by DONE.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    pub files_stored: u64,
    pub bytes_stored: u64,
    pub files_retrieved: u64,
    pub bytes_retrieved: u64,
}

impl TransferStats {
    pub fn record_store(&mut self, bytes: u64) {
        self.files_stored += 1;
        self.bytes_stored += bytes;
    }

    pub fn record_retrieve(&mut self, bytes: u64) {
        self.files_retrieved += 1;
        self.bytes_retrieved += bytes;
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files stored ({} bytes), {} files retrieved ({} bytes)",
            self.files_stored, self.bytes_stored, self.files_retrieved, self.bytes_retrieved
        )
    }
}

/// State owned exclusively by one connection.
#[derive(Debug)]
pub struct Session {
    peer: String,
    pub auth: Authenticator,
    current_virtual_path: String,
    mode: TransmissionMode,
    pub stats: TransferStats,
}

impl Session {
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            auth: Authenticator::new(),
            current_virtual_path: "/".to_string(),
            mode: TransmissionMode::default(),
            stats: TransferStats::default(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Returns the current virtual path of the client.
    pub fn current_virtual_path(&self) -> &str {
        &self.current_virtual_path
    }

    pub fn set_current_virtual_path(&mut self, path: String) {
        self.current_virtual_path = path;
    }

    pub fn mode(&self) -> TransmissionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransmissionMode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_home_in_binary() {
        let session = Session::new("127.0.0.1:5000");
        assert_eq!(session.current_virtual_path(), "/");
        assert_eq!(session.mode(), TransmissionMode::Binary);
        assert!(!session.is_logged_in());
        assert_eq!(session.peer(), "127.0.0.1:5000");
    }

    #[test]
    fn stats_accumulate() {
        let mut stats = TransferStats::default();
        stats.record_store(10);
        stats.record_store(5);
        stats.record_retrieve(7);
        assert_eq!(
            stats.summary(),
            "2 files stored (15 bytes), 1 files retrieved (7 bytes)"
        );
    }
}
