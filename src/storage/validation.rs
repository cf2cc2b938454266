//! Path validation
//!
//! Client paths are virtual: `/` is the home root. Every argument is
//! normalised lexically and must stay under the root; existing targets are
//! also canonicalised so symlinks cannot lead outside it.

use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Resolves `relative` against the virtual directory `base`.
///
/// A leading `/` in `relative` is ignored: paths never leave the home root,
/// and `..` above the root is an error.
pub fn resolve_virtual(base: &str, relative: &str) -> Result<String, StorageError> {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(base).join(relative.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(StorageError::PathEscape(relative.to_string()));
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Ok(format!("/{}", parts.join("/")))
}

/// Maps a virtual path onto the real filesystem under `root`.
pub fn virtual_to_real_path(root: &Path, virtual_path: &str) -> PathBuf {
    let relative = virtual_path.trim_start_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

/// Rejects an existing `real` path whose canonical form is outside `root`.
///
/// `root` must already be canonical. Paths that do not exist yet are checked
/// through their parent directory. A dangling symlink is rejected outright:
/// opening it for writing would create its target wherever it points.
pub fn ensure_within_root(root: &Path, real: &Path, shown_as: &str) -> Result<(), StorageError> {
    let target = match real.symlink_metadata() {
        Ok(_) if real.exists() => real,
        Ok(_) => return Err(StorageError::PathEscape(shown_as.to_string())),
        Err(_) => match real.parent() {
            Some(parent) if parent.exists() => parent,
            _ => return Ok(()),
        },
    };
    let canonical = target.canonicalize()?;
    if canonical.starts_with(root) {
        Ok(())
    } else {
        Err(StorageError::PathEscape(shown_as.to_string()))
    }
}

/// Resolves a client-supplied file argument to its virtual and real paths.
pub fn resolve_file_path(
    root: &Path,
    current_virtual_path: &str,
    filename: &str,
) -> Result<(PathBuf, String), StorageError> {
    let virtual_path = resolve_virtual(current_virtual_path, filename)?;
    if virtual_path == "/" {
        return Err(StorageError::NotAFile(filename.to_string()));
    }
    let real_path = virtual_to_real_path(root, &virtual_path);
    ensure_within_root(root, &real_path, filename)?;
    Ok((real_path, virtual_path))
}
