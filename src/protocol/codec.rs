//! Transmission codec
//!
//! Reads NUL-terminated control messages and writes framed responses. The
//! same stream doubles as the data channel during STOR/RETR, so raw reads go
//! through the codec's buffer and never skip bytes it already pulled in.

use std::time::Duration;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{ConnectionError, ProtocolError, SessionError};
use crate::protocol::Response;

/// Terminator of every control message.
pub const TERMINATOR: u8 = 0;

pub struct Connection<S> {
    stream: BufReader<S>,
    max_message_length: usize,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, max_message_length: usize) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_message_length,
        }
    }

    /// Reads one message, without its terminator.
    ///
    /// A message longer than the configured limit is consumed up to its
    /// terminator and reported as a protocol error, leaving the stream
    /// positioned at the next message.
    pub async fn read_message(&mut self) -> Result<String, SessionError> {
        let mut message = Vec::new();
        let mut oversized = false;

        loop {
            let available = self
                .stream
                .fill_buf()
                .await
                .map_err(ConnectionError::Io)?;
            if available.is_empty() {
                return Err(ConnectionError::Closed.into());
            }

            let end = available.iter().position(|&b| b == TERMINATOR);
            let chunk = &available[..end.unwrap_or(available.len())];
            if !oversized {
                if message.len() + chunk.len() > self.max_message_length {
                    oversized = true;
                    message.clear();
                } else {
                    message.extend_from_slice(chunk);
                }
            }

            let consumed = end.map_or(available.len(), |i| i + 1);
            self.stream.consume(consumed);
            if end.is_some() {
                break;
            }
        }

        if oversized {
            return Err(ProtocolError::MessageTooLong(self.max_message_length).into());
        }
        Ok(String::from_utf8_lossy(&message).into_owned())
    }

    /// Reads one message, failing with a timeout if `limit` elapses first.
    pub async fn read_message_within(
        &mut self,
        limit: Option<Duration>,
    ) -> Result<String, SessionError> {
        match limit {
            Some(limit) => tokio::time::timeout(limit, self.read_message())
                .await
                .map_err(|_| ConnectionError::Timeout(limit))?,
            None => self.read_message().await,
        }
    }

    pub async fn send(&mut self, response: &Response) -> Result<(), ConnectionError> {
        debug!(
            "Sending {}{}",
            response.status.symbol() as char,
            response.message
        );
        let stream = self.stream.get_mut();
        stream.write_all(&response.encode()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Buffered read half of the data channel.
    pub fn data_reader(&mut self) -> &mut BufReader<S> {
        &mut self.stream
    }

    /// Write half of the data channel.
    pub fn data_writer(&mut self) -> &mut S {
        self.stream.get_mut()
    }

    pub async fn shutdown(&mut self) -> Result<(), ConnectionError> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }
}
