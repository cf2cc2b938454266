//! Module `commands`
//!
//! Splits a decoded message into a verb and its remainder, validates the
//! verb against the fixed command set and parses each command's own argument
//! grammar. Commands that take a filename keep the whole remainder, since
//! filenames may contain spaces.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::navigate::ListFormat;
use crate::transfer::{StoreMode, TransmissionMode};

/// The closed set of top-level verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    User,
    Pass,
    Acct,
    Type,
    List,
    Cdir,
    Kill,
    Name,
    Done,
    Retr,
    Stor,
}

impl Verb {
    pub const ALL: [Verb; 11] = [
        Verb::User,
        Verb::Pass,
        Verb::Acct,
        Verb::Type,
        Verb::List,
        Verb::Cdir,
        Verb::Kill,
        Verb::Name,
        Verb::Done,
        Verb::Retr,
        Verb::Stor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::User => "USER",
            Verb::Pass => "PASS",
            Verb::Acct => "ACCT",
            Verb::Type => "TYPE",
            Verb::List => "LIST",
            Verb::Cdir => "CDIR",
            Verb::Kill => "KILL",
            Verb::Name => "NAME",
            Verb::Done => "DONE",
            Verb::Retr => "RETR",
            Verb::Stor => "STOR",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.len() != 4 || !token.is_ascii() {
            return Err(ProtocolError::InvalidCommand);
        }
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(token))
            .ok_or(ProtocolError::InvalidCommand)
    }
}

/// A validated command with its parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    User(String),
    Pass(String),
    Acct(String),
    Type(TransmissionMode),
    List {
        format: ListFormat,
        directory: Option<String>,
    },
    Cdir(String),
    Kill(String),
    Name(String),
    Done,
    Retr(String),
    Stor {
        mode: StoreMode,
        filename: String,
    },
}

impl Command {
    pub fn verb(&self) -> Verb {
        match self {
            Command::User(_) => Verb::User,
            Command::Pass(_) => Verb::Pass,
            Command::Acct(_) => Verb::Acct,
            Command::Type(_) => Verb::Type,
            Command::List { .. } => Verb::List,
            Command::Cdir(_) => Verb::Cdir,
            Command::Kill(_) => Verb::Kill,
            Command::Name(_) => Verb::Name,
            Command::Done => Verb::Done,
            Command::Retr(_) => Verb::Retr,
            Command::Stor { .. } => Verb::Stor,
        }
    }

    /// Parses the remainder of a message according to `verb`'s grammar.
    pub fn parse(verb: Verb, rest: &str) -> Result<Self, ProtocolError> {
        let command = match verb {
            Verb::User => Command::User(single_token(rest, "Invalid user-id, try again")?),
            Verb::Pass => Command::Pass(rest.to_string()),
            Verb::Acct => Command::Acct(required(rest, "Missing account name")?),
            Verb::Type => {
                let token = single_token(rest, "Type not valid")?;
                Command::Type(token.parse()?)
            }
            Verb::List => {
                let (format, directory) = split_word(rest);
                if format.is_empty() {
                    return Err(ProtocolError::InvalidArguments("Invalid arguments"));
                }
                Command::List {
                    format: format.parse()?,
                    directory: (!directory.is_empty()).then(|| directory.to_string()),
                }
            }
            Verb::Cdir => Command::Cdir(single_token(
                rest,
                "Can't connect to directory because: invalid arguments",
            )?),
            Verb::Kill => Command::Kill(required(rest, "Missing argument")?),
            Verb::Name => Command::Name(required(rest, "Missing argument")?),
            Verb::Done => Command::Done,
            Verb::Retr => Command::Retr(required(rest, "Missing argument")?),
            Verb::Stor => {
                let (mode, filename) = split_word(rest);
                let mode = mode.parse()?;
                Command::Stor {
                    mode,
                    filename: required(filename, "Missing filename, STOR aborted")?,
                }
            }
        };
        Ok(command)
    }
}

/// Splits `input` at the first whitespace run.
///
/// The remainder keeps any inner and trailing spaces.
pub fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

/// Validates a top-level message and parses it into a command.
pub fn parse_command(message: &str) -> Result<Command, ProtocolError> {
    let (token, rest) = split_word(message);
    let verb: Verb = token.parse()?;
    Command::parse(verb, rest)
}

/// Narrow validator used while CDIR waits for re-authentication: only
/// PASS and ACCT are accepted.
pub fn parse_reauth_command(message: &str) -> Result<Command, ProtocolError> {
    let (token, rest) = split_word(message);
    match token.parse()? {
        verb @ (Verb::Pass | Verb::Acct) => Command::parse(verb, rest),
        _ => Err(ProtocolError::InvalidCommand),
    }
}

/// Parses the `SIZE <bytes>` reply that follows a STOR announcement.
pub fn parse_size(message: &str) -> Result<u64, ProtocolError> {
    let (token, rest) = split_word(message);
    if !token.eq_ignore_ascii_case("SIZE") {
        return Err(ProtocolError::UnexpectedFollowUp("SIZE <bytes>"));
    }
    rest.trim().parse().map_err(|_| ProtocolError::InvalidSize)
}

/// Reply to a RETR size announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrReply {
    Send,
    Stop,
    Other,
}

impl RetrReply {
    pub fn parse(message: &str) -> Self {
        let message = message.trim();
        if message.eq_ignore_ascii_case("SEND") {
            RetrReply::Send
        } else if message.eq_ignore_ascii_case("STOP") {
            RetrReply::Stop
        } else {
            RetrReply::Other
        }
    }
}

/// Parses the `TOBE <newname>` reply that completes a NAME.
pub fn parse_tobe(message: &str) -> Option<String> {
    let (token, rest) = split_word(message);
    (token.eq_ignore_ascii_case("TOBE") && !rest.is_empty()).then(|| rest.to_string())
}

fn single_token(rest: &str, message: &'static str) -> Result<String, ProtocolError> {
    let mut tokens = rest.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => Ok(token.to_string()),
        _ => Err(ProtocolError::InvalidArguments(message)),
    }
}

fn required(rest: &str, message: &'static str) -> Result<String, ProtocolError> {
    if rest.trim().is_empty() {
        Err(ProtocolError::InvalidArguments(message))
    } else {
        Ok(rest.to_string())
    }
}
