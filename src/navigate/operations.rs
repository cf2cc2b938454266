//! Navigation operations implementation

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::validation::{ensure_within_root, resolve_virtual, virtual_to_real_path};

/// Resolves a CDIR target. CDIR paths are taken relative to the home root.
pub fn resolve_directory(
    server_root: &Path,
    target_path: &str,
) -> Result<(String, PathBuf), StorageError> {
    resolve_subdirectory(server_root, "/", target_path)
}

/// Resolves `target_path` against `base` and checks it is an existing directory.
pub fn resolve_subdirectory(
    server_root: &Path,
    base: &str,
    target_path: &str,
) -> Result<(String, PathBuf), StorageError> {
    let new_virtual_path = resolve_virtual(base, target_path)?;
    let real_path = virtual_to_real_path(server_root, &new_virtual_path);

    if !real_path.is_dir() {
        return Err(StorageError::DirectoryNotFound(new_virtual_path));
    }
    ensure_within_root(server_root, &real_path, target_path)?;

    Ok((new_virtual_path, real_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdir_is_relative_to_home_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("docs/reports")).unwrap();

        let (virtual_path, real) = resolve_directory(&root, "docs/reports").unwrap();
        assert_eq!(virtual_path, "/docs/reports");
        assert_eq!(real, root.join("docs/reports"));

        let (virtual_path, _) = resolve_directory(&root, "/docs").unwrap();
        assert_eq!(virtual_path, "/docs");
    }

    #[test]
    fn rejects_files_and_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("file.txt"), b"x").unwrap();

        assert!(matches!(
            resolve_directory(&root, "file.txt"),
            Err(StorageError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            resolve_directory(&root, "nowhere"),
            Err(StorageError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            resolve_directory(&root, "../.."),
            Err(StorageError::PathEscape(_))
        ));
    }
}
