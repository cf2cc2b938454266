//! RAX SFTP Server - Entry Point
//!
//! A Rust server for the Simple File Transfer Protocol (RFC 913).

use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};

use rax_sftp_server::config::{DEFAULT_CONFIG_PATH, ServerConfig};
use rax_sftp_server::server::{Server, ServerContext};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match ServerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = config.credential_store();
    info!("Loaded {} user records", store.len());

    let context = match ServerContext::new(&config, Arc::new(store)) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to prepare server root {}: {e}", config.server_root);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching SFTP server...");
    match Server::new(&config, context).await {
        Ok(server) => {
            server.start().await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Server startup failed on {}: {e}", config.control_socket());
            ExitCode::FAILURE
        }
    }
}
