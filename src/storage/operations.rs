//! Storage operations
//!
//! KILL and NAME: delete and rename regular files in the home tree.

use log::{error, info};
use std::path::Path;

use crate::error::StorageError;
use crate::storage::validation::resolve_file_path;

/// Deletes a regular file. Directories are refused.
pub async fn delete_file(
    server_root: &Path,
    current_virtual_path: &str,
    filename: &str,
) -> Result<String, StorageError> {
    let (file_path, virtual_file_path) =
        resolve_file_path(server_root, current_virtual_path, filename)?;

    if !file_path.exists() {
        return Err(StorageError::FileNotFound(filename.to_string()));
    }
    if !file_path.is_file() {
        return Err(StorageError::NotAFile(filename.to_string()));
    }

    match tokio::fs::remove_file(&file_path).await {
        Ok(()) => {
            info!(
                "Deleted file {} (virtual: {}, real: {})",
                filename,
                virtual_file_path,
                file_path.display()
            );
            Ok(virtual_file_path)
        }
        Err(e) => {
            error!(
                "Failed to delete file {} (virtual: {}, real: {}): {}",
                filename,
                virtual_file_path,
                file_path.display(),
                e
            );
            Err(StorageError::DeleteFailed(e))
        }
    }
}

/// Checks that `filename` names an existing regular file, ready to be renamed.
pub fn prepare_rename(
    server_root: &Path,
    current_virtual_path: &str,
    filename: &str,
) -> Result<std::path::PathBuf, StorageError> {
    let (file_path, _) = resolve_file_path(server_root, current_virtual_path, filename)?;
    if file_path.is_file() {
        Ok(file_path)
    } else {
        Err(StorageError::FileNotFound(filename.to_string()))
    }
}

/// Renames `source` to `new_name`, never replacing an existing entry.
pub async fn rename_file(
    server_root: &Path,
    current_virtual_path: &str,
    source: &Path,
    new_name: &str,
) -> Result<(), StorageError> {
    let (target, virtual_target) = resolve_file_path(server_root, current_virtual_path, new_name)?;

    if tokio::fs::try_exists(&target).await? {
        return Err(StorageError::NameTaken(new_name.to_string()));
    }

    tokio::fs::rename(source, &target)
        .await
        .map_err(StorageError::RenameFailed)?;
    info!(
        "Renamed {} to {} (virtual: {})",
        source.display(),
        target.display(),
        virtual_target
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn home() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn deletes_regular_files_only() {
        let (_dir, root) = home();
        fs::write(root.join("a.txt"), b"x").unwrap();
        fs::create_dir(root.join("sub")).unwrap();

        assert_eq!(delete_file(&root, "/", "a.txt").await.unwrap(), "/a.txt");
        assert!(!root.join("a.txt").exists());
        assert!(matches!(
            delete_file(&root, "/", "sub").await,
            Err(StorageError::NotAFile(_))
        ));
        assert!(matches!(
            delete_file(&root, "/", "missing.txt").await,
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn rename_refuses_existing_target() {
        let (_dir, root) = home();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("b.txt"), b"b").unwrap();

        let source = prepare_rename(&root, "/", "a.txt").unwrap();
        assert!(matches!(
            rename_file(&root, "/", &source, "b.txt").await,
            Err(StorageError::NameTaken(_))
        ));
        assert_eq!(fs::read(root.join("b.txt")).unwrap(), b"b");

        rename_file(&root, "/", &source, "c d.txt").await.unwrap();
        assert_eq!(fs::read(root.join("c d.txt")).unwrap(), b"a");
        assert!(!root.join("a.txt").exists());
    }

    #[test]
    fn prepare_rename_requires_a_file() {
        let (_dir, root) = home();
        assert!(matches!(
            prepare_rename(&root, "/", "nope.txt"),
            Err(StorageError::FileNotFound(_))
        ));
    }
}
