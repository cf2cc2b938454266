//! Filesystem metadata
//!
//! Volume and ownership queries that the protocol needs but the standard
//! library does not expose portably.

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Free-space and owner lookups consumed by STOR and `LIST V`.
pub trait FsMetadata: Send + Sync {
    /// Bytes available to unprivileged users on the volume holding `dir`.
    fn available_space(&self, dir: &Path) -> io::Result<u64>;

    /// Name of the owner of a file.
    fn owner_name(&self, metadata: &Metadata) -> String;
}

/// Queries the local operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

#[cfg(unix)]
impl FsMetadata for LocalFs {
    fn available_space(&self, dir: &Path) -> io::Result<u64> {
        let stats = nix::sys::statvfs::statvfs(dir).map_err(io::Error::from)?;
        Ok((stats.blocks_available() as u64).saturating_mul(stats.fragment_size() as u64))
    }

    fn owner_name(&self, metadata: &Metadata) -> String {
        use nix::unistd::{Uid, User};
        use std::os::unix::fs::MetadataExt;

        let uid = metadata.uid();
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => user.name,
            _ => uid.to_string(),
        }
    }
}

#[cfg(not(unix))]
impl FsMetadata for LocalFs {
    fn available_space(&self, _dir: &Path) -> io::Result<u64> {
        Ok(u64::MAX)
    }

    fn owner_name(&self, _metadata: &Metadata) -> String {
        "unknown".to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn reports_space_for_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalFs.available_space(dir.path()).is_ok());
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(
            LocalFs
                .available_space(Path::new("/definitely/not/here"))
                .is_err()
        );
    }

    #[test]
    fn owner_name_is_never_empty() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = std::fs::metadata(dir.path()).unwrap();
        assert!(!LocalFs.owner_name(&metadata).is_empty());
    }
}
