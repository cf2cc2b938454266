//! Shared server context
//!
//! Read-only state handed to every session: configuration, the credential
//! store and the filesystem metadata collaborator.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::CredentialStore;
use crate::config::ServerConfig;
use crate::storage::{FsMetadata, LocalFs};

pub struct ServerContext {
    root: PathBuf,
    greeting: String,
    max_message_length: usize,
    buffer_size: usize,
    follow_up_timeout: Option<Duration>,
    idle_timeout: Option<Duration>,
    store: Arc<dyn CredentialStore>,
    fs: Arc<dyn FsMetadata>,
}

impl ServerContext {
    /// Builds a context, creating and canonicalising the home root.
    pub fn new(config: &ServerConfig, store: Arc<dyn CredentialStore>) -> io::Result<Self> {
        let root = config.server_root_path();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root: root.canonicalize()?,
            greeting: config.greeting.clone(),
            max_message_length: config.max_message_length,
            buffer_size: config.buffer_size,
            follow_up_timeout: config.follow_up_timeout(),
            idle_timeout: config.idle_timeout(),
            store,
            fs: Arc::new(LocalFs),
        })
    }

    /// Replaces the filesystem metadata collaborator.
    pub fn with_fs(mut self, fs: Arc<dyn FsMetadata>) -> Self {
        self.fs = fs;
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn follow_up_timeout(&self) -> Option<Duration> {
        self.follow_up_timeout
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn fs(&self) -> &dyn FsMetadata {
        self.fs.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[test]
    fn creates_and_canonicalises_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            server_root: dir.path().join("home").to_string_lossy().into_owned(),
            ..ServerConfig::default()
        };
        let ctx = ServerContext::new(&config, Arc::new(MemoryCredentialStore::new())).unwrap();
        assert!(ctx.root().is_dir());
        assert!(ctx.root().is_absolute());
        assert_eq!(ctx.greeting(), "RAX SFTP Service");
    }
}
