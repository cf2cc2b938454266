//! Configuration management for the RAX SFTP server
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `RAX_SFTP__*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::auth::{MemoryCredentialStore, UserRecord};

/// Default configuration file, looked up without extension.
pub const DEFAULT_CONFIG_PATH: &str = "config";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the control connection
    pub bind_address: String,

    /// Port for the control connection
    pub control_port: u16,

    /// Home directory root; clients never see anything above it
    pub server_root: String,

    /// Sent as a SUCCESS response when a client connects
    pub greeting: String,

    /// Maximum concurrent sessions
    pub max_clients: usize,

    /// Longest accepted control message, terminator excluded
    pub max_message_length: usize,

    /// Buffer size for file transfers
    pub buffer_size: usize,

    /// Timeout for SIZE, SEND/STOP, TOBE and re-authentication replies (0 disables)
    pub follow_up_timeout_secs: u64,

    /// Timeout for the next command (0 disables)
    pub idle_timeout_secs: u64,

    /// Users known to the in-memory credential store
    pub users: Vec<UserRecord>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            control_port: 6789,
            server_root: "storage".to_string(),
            greeting: "RAX SFTP Service".to_string(),
            max_clients: 10,
            max_message_length: 4096,
            buffer_size: 8192,
            follow_up_timeout_secs: 60,
            idle_timeout_secs: 0,
            users: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `path` (optional) with environment overrides
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_SFTP").separator("__"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.control_port == 0 {
            return Err(config::ConfigError::Message(
                "Control port cannot be 0".into(),
            ));
        }

        if self.server_root.is_empty() {
            return Err(config::ConfigError::Message(
                "server_root cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(config::ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    pub fn follow_up_timeout(&self) -> Option<Duration> {
        seconds(self.follow_up_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        seconds(self.idle_timeout_secs)
    }

    pub fn credential_store(&self) -> MemoryCredentialStore {
        self.users.iter().cloned().collect()
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
