//! Transfer engine
//!
//! STOR and RETR handshakes. Both run over the control connection: STOR
//! announces the resolved operation, waits for `SIZE`, checks free space and
//! then reads exactly that many bytes; RETR announces the file size and waits
//! for `SEND` or `STOP` before streaming the file.

use log::info;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::client::Session;
use crate::error::{SessionError, StorageError, TransferError};
use crate::protocol::codec::Connection;
use crate::protocol::commands::{RetrReply, parse_size};
use crate::protocol::Response;
use crate::server::ServerContext;
use crate::storage::validation::resolve_file_path;
use crate::transfer::file_ops::{receive_file, send_file};
use crate::transfer::intent::{StoreMode, StoreOperation, TransferIntent};

/// Runs a complete STOR exchange and returns the final response.
pub async fn handle_stor<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
    mode: StoreMode,
    filename: &str,
) -> Result<Option<Response>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (path, virtual_path) =
        resolve_file_path(ctx.root(), session.current_virtual_path(), filename)?;

    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(StorageError::Io)?;
    if exists && !path.is_file() {
        return Err(StorageError::NotAFile(filename.to_string()).into());
    }
    let dir = match path.parent() {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => return Err(StorageError::DirectoryNotFound(virtual_path).into()),
    };

    let operation = StoreOperation::resolve(mode, exists);
    let mut intent = TransferIntent::new(filename, path, operation);
    info!(
        "Client {} requested to store {} as {:?} (real: {})",
        session.peer(),
        virtual_path,
        operation,
        intent.path.display()
    );
    conn.send(&Response::success(operation.announcement(mode)))
        .await?;

    let reply = conn.read_message_within(ctx.follow_up_timeout()).await?;
    let size = parse_size(&reply)?;

    let available = ctx.fs().available_space(&dir).map_err(StorageError::Io)?;
    if size >= available {
        return Err(StorageError::InsufficientSpace {
            needed: size,
            available,
        }
        .into());
    }
    conn.send(&Response::success("ok, waiting for file")).await?;

    // The client is now sending data; any failure from here on leaves the
    // stream unusable.
    let (final_name, mut file) = intent
        .open_target()
        .await
        .map_err(|source| aborted(&virtual_path, source))?;

    let received = receive_file(
        conn.data_reader(),
        &mut file,
        size,
        session.mode(),
        ctx.buffer_size(),
        &virtual_path,
    )
    .await?;
    session.stats.record_store(received);

    info!(
        "Client {} stored {} ({} bytes)",
        session.peer(),
        final_name,
        received
    );
    Ok(Some(Response::success(format!("Saved {final_name}"))))
}

/// Runs a complete RETR exchange. A successful send has no trailing response.
pub async fn handle_retr<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
    filename: &str,
) -> Result<Option<Response>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (path, virtual_path) =
        resolve_file_path(ctx.root(), session.current_virtual_path(), filename)?;

    let size = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        _ => return Err(StorageError::FileNotFound(virtual_path).into()),
    };
    conn.send(&Response::empty(size.to_string())).await?;

    let reply = conn.read_message_within(ctx.follow_up_timeout()).await?;
    match RetrReply::parse(&reply) {
        RetrReply::Send => {}
        RetrReply::Stop => return Ok(Some(Response::error("ok, RETR aborted"))),
        RetrReply::Other => {
            return Ok(Some(Response::error("invalid command, RETR aborted")));
        }
    }

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|source| aborted(&virtual_path, source))?;
    let mut file = file.take(size);
    let sent = send_file(
        &mut file,
        conn.data_writer(),
        session.mode(),
        ctx.buffer_size(),
        &virtual_path,
    )
    .await?;
    session.stats.record_retrieve(sent);

    info!(
        "Client {} retrieved {} ({} bytes)",
        session.peer(),
        virtual_path,
        sent
    );
    Ok(None)
}

fn aborted(path: &str, source: std::io::Error) -> SessionError {
    TransferError::Aborted {
        path: path.to_string(),
        source,
    }
    .into()
}
