//! Command handlers
//!
//! Routes validated commands to the authentication machine, the navigator
//! and the transfer engine. Handlers that need a follow-up message read it
//! from the connection themselves; the returned response is the final one.

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::auth::AuthOutcome;
use crate::client::Session;
use crate::error::{AuthError, SessionError, StorageError};
use crate::navigate::{self, ListFormat};
use crate::protocol::codec::Connection;
use crate::protocol::commands::{Command, parse_reauth_command, parse_tobe};
use crate::protocol::{CommandResult, Response};
use crate::server::ServerContext;
use crate::storage;
use crate::transfer::{self, StoreMode, TransmissionMode};

/// Dispatches a parsed command to its handler.
pub async fn handle_command<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
    command: Command,
) -> Result<CommandResult, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match command {
        Command::User(username) => Some(handle_cmd_user(session, ctx, &username)?),
        Command::Pass(password) => Some(handle_cmd_pass(session, &password)?),
        Command::Acct(account) => Some(handle_cmd_acct(session, &account)?),
        Command::Type(mode) => Some(handle_cmd_type(session, mode)?),
        Command::List { format, directory } => {
            Some(handle_cmd_list(session, ctx, format, directory.as_deref()).await?)
        }
        Command::Cdir(path) => Some(handle_cmd_cdir(conn, session, ctx, &path).await?),
        Command::Kill(filename) => Some(handle_cmd_kill(session, ctx, &filename).await?),
        Command::Name(filename) => Some(handle_cmd_name(conn, session, ctx, &filename).await?),
        Command::Done => return Ok(CommandResult::close(handle_cmd_done(session))),
        Command::Retr(filename) => {
            require_login(session)?;
            transfer::handle_retr(conn, session, ctx, &filename).await?
        }
        Command::Stor { mode, filename } => {
            handle_cmd_stor(conn, session, ctx, mode, &filename).await?
        }
    };
    Ok(CommandResult::reply(response))
}

fn require_login(session: &Session) -> Result<(), AuthError> {
    if session.is_logged_in() {
        Ok(())
    } else {
        Err(AuthError::NotLoggedIn)
    }
}

fn outcome_response(outcome: AuthOutcome, logged_in_message: String) -> Response {
    match outcome {
        AuthOutcome::LoggedIn => Response::logged_in(logged_in_message),
        other => Response::success(other.prompt()),
    }
}

fn handle_cmd_user(
    session: &mut Session,
    ctx: &ServerContext,
    username: &str,
) -> Result<Response, SessionError> {
    let outcome = session.auth.user(ctx.store(), username)?;
    info!("Client {} identified as {}", session.peer(), username);
    Ok(outcome_response(outcome, format!("{username} logged in")))
}

fn handle_cmd_pass(session: &mut Session, password: &str) -> Result<Response, SessionError> {
    let outcome = session.auth.pass(password)?;
    Ok(outcome_response(outcome, "Logged in".to_string()))
}

fn handle_cmd_acct(session: &mut Session, account: &str) -> Result<Response, SessionError> {
    let outcome = session.auth.acct(account)?;
    Ok(outcome_response(outcome, "Account valid, logged-in".to_string()))
}

fn handle_cmd_type(
    session: &mut Session,
    mode: TransmissionMode,
) -> Result<Response, SessionError> {
    require_login(session)?;
    session.set_mode(mode);
    Ok(Response::success(format!("Using {mode} mode")))
}

async fn handle_cmd_list(
    session: &Session,
    ctx: &ServerContext,
    format: ListFormat,
    directory: Option<&str>,
) -> Result<Response, SessionError> {
    require_login(session)?;
    let (virtual_path, real_path) = navigate::resolve_subdirectory(
        ctx.root(),
        session.current_virtual_path(),
        directory.unwrap_or("."),
    )?;
    let listing = navigate::list_directory(&real_path, &virtual_path, format, ctx.fs()).await?;
    Ok(Response::success(listing))
}

/// CDIR: validates the target, re-authenticates if the session's password
/// or account is not yet established, then commits the change.
async fn handle_cmd_cdir<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
    path: &str,
) -> Result<Response, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (virtual_path, real_path) = navigate::resolve_directory(ctx.root(), path)?;
    if !session.auth.username_valid() {
        return Err(AuthError::NoUser.into());
    }

    if !session.auth.password_valid() || !session.auth.account_valid() {
        conn.send(&Response::success("Directory ok, send account/password"))
            .await?;
        reauthenticate(conn, session, ctx).await?;
    }

    info!(
        "Client {} ({}) changed directory to {} (real: {})",
        session.peer(),
        session.auth.username().unwrap_or("-"),
        virtual_path,
        real_path.display()
    );
    session.set_current_virtual_path(virtual_path);
    Ok(Response::logged_in(format!(
        "Changed working dir to {}",
        session.current_virtual_path()
    )))
}

/// Accepts only PASS and ACCT until the session is logged in. Anything else
/// is rejected and the wait continues.
async fn reauthenticate<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let message = match conn.read_message_within(ctx.follow_up_timeout()).await {
            Ok(message) => message,
            Err(e) if !e.is_fatal() => {
                report(conn, session, &e).await?;
                continue;
            }
            Err(e) => return Err(e),
        };

        let result = match parse_reauth_command(&message) {
            Ok(Command::Pass(password)) => session.auth.pass(&password).map_err(SessionError::from),
            Ok(Command::Acct(account)) => session.auth.acct(&account).map_err(SessionError::from),
            Ok(_) => Err(crate::error::ProtocolError::InvalidCommand.into()),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(AuthOutcome::LoggedIn) => return Ok(()),
            Ok(outcome) => conn.send(&Response::success(outcome.prompt())).await?,
            Err(e) => report(conn, session, &e).await?,
        }
    }
}

async fn report<S>(
    conn: &mut Connection<S>,
    session: &Session,
    err: &SessionError,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    crate::error::log_session_error(session.peer(), err);
    if let Some(response) = err.to_response() {
        conn.send(&response).await?;
    }
    Ok(())
}

async fn handle_cmd_kill(
    session: &Session,
    ctx: &ServerContext,
    filename: &str,
) -> Result<Response, SessionError> {
    require_login(session)?;
    storage::delete_file(ctx.root(), session.current_virtual_path(), filename).await?;
    Ok(Response::success(format!("{filename} deleted")))
}

/// NAME: checks the source, then waits for `TOBE <newname>`.
async fn handle_cmd_name<S>(
    conn: &mut Connection<S>,
    session: &Session,
    ctx: &ServerContext,
    filename: &str,
) -> Result<Response, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    require_login(session)?;
    let prepared = storage::prepare_rename(ctx.root(), session.current_virtual_path(), filename);
    let source = match prepared {
        Ok(source) => source,
        Err(StorageError::FileNotFound(_)) => {
            return Ok(Response::error(format!("Can't find {filename}")));
        }
        Err(e) => return Err(e.into()),
    };
    conn.send(&Response::success("File exists")).await?;

    let reply = conn.read_message_within(ctx.follow_up_timeout()).await?;
    let Some(new_name) = parse_tobe(&reply) else {
        warn!(
            "Client {} abandoned rename of {}: got {:?}",
            session.peer(),
            filename,
            reply
        );
        return Ok(Response::error(
            "File wasn't renamed because of an invalid command or a missing argument",
        ));
    };

    storage::rename_file(ctx.root(), session.current_virtual_path(), &source, &new_name).await?;
    Ok(Response::success(format!("{filename} renamed to {new_name}")))
}

fn handle_cmd_done(session: &Session) -> Response {
    info!(
        "Client {} finished: {}",
        session.peer(),
        session.stats.summary()
    );
    Response::success(format!("Closing connection, {}", session.stats.summary()))
}

async fn handle_cmd_stor<S>(
    conn: &mut Connection<S>,
    session: &mut Session,
    ctx: &ServerContext,
    mode: StoreMode,
    filename: &str,
) -> Result<Option<Response>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    require_login(session)?;
    transfer::handle_stor(conn, session, ctx, mode, filename).await
}
