//! Response values
//!
//! Every outbound control message is `<status symbol><text><NUL>`.

/// Status carried in the first byte of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `+`
    Success,
    /// `-`
    Error,
    /// `!` success, and the session is now logged in
    LoggedIn,
    /// ` ` informational (e.g. the RETR size announcement)
    Empty,
}

impl Status {
    pub fn symbol(self) -> u8 {
        match self {
            Status::Success => b'+',
            Status::Error => b'-',
            Status::LoggedIn => b'!',
            Status::Empty => b' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub message: String,
}

impl Response {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Status::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }

    pub fn logged_in(message: impl Into<String>) -> Self {
        Self::new(Status::LoggedIn, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(Status::Empty, message)
    }

    /// Frames the response for the wire, terminator included.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.message.len() + 2);
        frame.push(self.status.symbol());
        frame.extend_from_slice(self.message.as_bytes());
        frame.push(super::codec::TERMINATOR);
        frame
    }
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

/// Final outcome of one top-level command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub response: Option<Response>,
}

impl CommandResult {
    pub fn reply(response: Option<Response>) -> Self {
        Self {
            status: CommandStatus::Continue,
            response,
        }
    }

    pub fn close(response: Response) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            response: Some(response),
        }
    }
}
