use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::client::Session;
use crate::error::{SessionError, log_session_error};
use crate::protocol::{CommandStatus, Connection, Response, handle_command, parse_command};
use crate::server::ServerContext;

/// Serves one client from greeting to DONE or disconnect.
///
/// - Reads NUL-terminated messages from the stream.
/// - Rejects malformed commands before any handler runs.
/// - Reports non-fatal errors to the client and keeps going; returns on the
///   first fatal one.
pub async fn handle_client<S>(
    stream: S,
    peer: impl Into<String>,
    ctx: &ServerContext,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = Session::new(peer);
    let mut conn = Connection::new(stream, ctx.max_message_length());

    conn.send(&Response::success(ctx.greeting())).await?;

    loop {
        let outcome = match conn.read_message_within(ctx.idle_timeout()).await {
            Ok(message) => {
                info!("Received from {}: {}", session.peer(), redact(&message));
                match parse_command(&message) {
                    Ok(command) => {
                        debug!("Dispatching {} for {}", command.verb(), session.peer());
                        handle_command(&mut conn, &mut session, ctx, command).await
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                if let Some(response) = &result.response {
                    conn.send(response).await?;
                }
                if result.status == CommandStatus::CloseConnection {
                    if let Err(e) = conn.shutdown().await {
                        warn!("Failed to shut down connection to {}: {}", session.peer(), e);
                    }
                    info!("Client {} disconnected", session.peer());
                    return Ok(());
                }
            }
            Err(e) => {
                log_session_error(session.peer(), &e);
                match e.to_response() {
                    Some(response) => conn.send(&response).await?,
                    None => return Err(e),
                }
            }
        }
    }
}

/// Hides PASS arguments from the log.
fn redact(message: &str) -> String {
    match message.get(..4) {
        Some(verb) if verb.eq_ignore_ascii_case("PASS") => "PASS ****".to_string(),
        _ => message.to_string(),
    }
}
