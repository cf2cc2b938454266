//! Error types
//!
//! Defines domain-specific error types for each module of the server. The
//! `Display` text of every non-fatal error is what the client sees after the
//! `-` status symbol, so messages are written for the remote user.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::Response;

/// Malformed or unexpected control messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid command")]
    InvalidCommand,
    #[error("{0}")]
    InvalidArguments(&'static str),
    #[error("message longer than {0} bytes")]
    MessageTooLong(usize),
    #[error("Invalid message received, expected {0}")]
    UnexpectedFollowUp(&'static str),
    #[error("Invalid file size, expected SIZE <bytes>")]
    InvalidSize,
}

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid user-id, try again")]
    UnknownUser(String),
    #[error("Wrong password, try again")]
    WrongPassword,
    #[error("Invalid account, try again")]
    InvalidAccount(String),
    #[error("No user-id given, send USER first")]
    NoUser,
    #[error("Not logged in")]
    NotLoggedIn,
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File doesn't exist")]
    FileNotFound(String),
    #[error("{0} is not a regular file")]
    NotAFile(String),
    #[error("Invalid directory")]
    DirectoryNotFound(String),
    #[error("{0} is outside the home directory")]
    PathEscape(String),
    #[error("Not enough room, don't send it")]
    InsufficientSpace { needed: u64, available: u64 },
    #[error("{0} is already taken, try again with a different name")]
    NameTaken(String),
    #[error("Not deleted because {0}")]
    DeleteFailed(io::Error),
    #[error("File wasn't renamed because {0}")]
    RenameFailed(io::Error),
    #[error("Files access errors")]
    Listing(io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures after the data channel has started carrying file bytes.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer of {path} aborted: {source}")]
    Aborted {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// The control connection itself is unusable.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by peer")]
    Closed,
    #[error("timed out after {0:?} waiting for the client")]
    Timeout(Duration),
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

/// Any error raised while serving one session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl SessionError {
    /// Fatal errors end the session; the rest are reported and the session continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Transfer(_) | SessionError::Connection(_))
    }

    /// The ERROR response reported to the client, or `None` when the channel is unusable.
    pub fn to_response(&self) -> Option<Response> {
        if self.is_fatal() {
            None
        } else {
            Some(Response::error(self.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;

    #[test]
    fn protocol_errors_are_reported_not_fatal() {
        let err = SessionError::from(ProtocolError::InvalidCommand);
        assert!(!err.is_fatal());
        let response = err.to_response().unwrap();
        assert_eq!(response.status, Status::Error);
        assert_eq!(response.message, "invalid command");
    }

    #[test]
    fn connection_errors_are_fatal_and_silent() {
        let err = SessionError::from(ConnectionError::Closed);
        assert!(err.is_fatal());
        assert!(err.to_response().is_none());
    }

    #[test]
    fn transfer_errors_are_fatal() {
        let err = SessionError::from(TransferError::Aborted {
            path: "/a.txt".into(),
            source: io::Error::other("disk gone"),
        });
        assert!(err.is_fatal());
    }

    #[test]
    fn space_error_uses_protocol_wording() {
        let err = SessionError::from(StorageError::InsufficientSpace {
            needed: 10,
            available: 5,
        });
        assert_eq!(err.to_string(), "Not enough room, don't send it");
    }
}
