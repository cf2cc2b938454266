//! Module `file_ops`
//!
//! Byte-copy loops between the data channel and local files. Both directions
//! recode chunks through the active transmission mode.

use log::info;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ConnectionError, SessionError, TransferError};
use crate::transfer::TransmissionMode;

/// Copies exactly `size` bytes from the data channel into `file`.
///
/// A peer that closes early is a connection error; a failing write aborts
/// the transfer.
pub async fn receive_file<R, W>(
    data: &mut R,
    file: &mut W,
    size: u64,
    mode: TransmissionMode,
    buffer_size: usize,
    path: &str,
) -> Result<u64, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut remaining = size;

    while remaining > 0 {
        let want = buffer.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = data
            .read(&mut buffer[..want])
            .await
            .map_err(ConnectionError::Io)?;
        if n == 0 {
            return Err(ConnectionError::Closed.into());
        }

        mode.recode(&mut buffer[..n]);
        file.write_all(&buffer[..n])
            .await
            .map_err(|source| aborted(path, source))?;
        remaining -= n as u64;
    }

    file.flush().await.map_err(|source| aborted(path, source))?;
    info!("Received {size} bytes into {path} ({mode} mode)");
    Ok(size)
}

/// Streams `file` to the data channel until end of file.
pub async fn send_file<R, W>(
    file: &mut R,
    data: &mut W,
    mode: TransmissionMode,
    buffer_size: usize,
    path: &str,
) -> Result<u64, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total_bytes_sent = 0u64;

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .map_err(|source| aborted(path, source))?;
        if n == 0 {
            break;
        }

        mode.recode(&mut buffer[..n]);
        data.write_all(&buffer[..n])
            .await
            .map_err(ConnectionError::Io)?;
        total_bytes_sent += n as u64;
    }

    data.flush().await.map_err(ConnectionError::Io)?;
    info!("Sent {total_bytes_sent} bytes from {path} ({mode} mode)");
    Ok(total_bytes_sent)
}

fn aborted(path: &str, source: std::io::Error) -> SessionError {
    TransferError::Aborted {
        path: path.to_string(),
        source,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receives_exactly_the_declared_size() {
        let mut data: &[u8] = b"hello, world and more";
        let mut file = Vec::new();
        let n = receive_file(&mut data, &mut file, 5, TransmissionMode::Binary, 2, "t")
            .await
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(file, b"hello");
        assert_eq!(data, b", world and more");
    }

    #[tokio::test]
    async fn zero_size_reads_nothing() {
        let mut data: &[u8] = b"next message";
        let mut file = Vec::new();
        receive_file(&mut data, &mut file, 0, TransmissionMode::Binary, 8, "t")
            .await
            .unwrap();
        assert!(file.is_empty());
        assert_eq!(data, b"next message");
    }

    #[tokio::test]
    async fn short_stream_is_a_connection_error() {
        let mut data: &[u8] = b"abc";
        let mut file = Vec::new();
        let err = receive_file(&mut data, &mut file, 10, TransmissionMode::Binary, 8, "t")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Connection(ConnectionError::Closed)
        ));
    }

    #[tokio::test]
    async fn ascii_send_recodes_high_bytes() {
        let mut file: &[u8] = &[b'o', b'k', 0xe9, 0x00];
        let mut data = Vec::new();
        let n = send_file(&mut file, &mut data, TransmissionMode::Ascii, 3, "t")
            .await
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(data, vec![b'o', b'k', b'?', 0x00]);
    }
}
