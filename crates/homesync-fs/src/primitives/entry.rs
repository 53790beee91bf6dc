use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Whether anything occupies `path`, without following symlinks.
///
/// A dangling symlink exists.
pub fn entry_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Remove whatever occupies `path`: a directory tree, a file or a symlink.
///
/// Symlinks are removed, never followed. A missing path is not an error.
pub fn remove_entry(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.map_err(|e| Error::Remove {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create `path` and any missing ancestors, returning the directories that
/// did not exist before, outermost first.
pub fn create_missing_dirs(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut missing = Vec::new();
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() || entry_exists(ancestor)? {
            break;
        }
        missing.push(ancestor.to_path_buf());
    }
    missing.reverse();

    std::fs::create_dir_all(path).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(missing)
}

/// Undo [`create_missing_dirs`], innermost first. Directories that are no
/// longer empty are left alone.
pub fn remove_created_dirs(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        match std::fs::remove_dir(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "failed to remove created directory");
                break;
            }
        }
    }
}
