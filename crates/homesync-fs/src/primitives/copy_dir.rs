use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Recursively copy the directory `src` to `dest`.
///
/// Symlinks are recreated as symlinks, dangling ones included. Regular files
/// keep their mode bits. Sockets, FIFOs and device nodes are skipped.
pub fn copy_dir_all(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if !dest.exists() {
        fs::create_dir_all(dest).map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }

    let permissions = fs::metadata(src)
        .map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?
        .permissions();

    for entry in fs::read_dir(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })? {
        let entry = entry.map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| Error::Read {
            path: entry.path(),
            source: e,
        })?;

        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else if file_type.is_symlink() {
            super::copy_symlink(&src_path, &dest_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dest_path).map_err(|e| Error::Write {
                path: dest_path,
                source: e,
            })?;
        } else {
            tracing::debug!(path = %src_path.display(), "skipping special file");
        }
    }

    // Applied last so a read-only source directory can still be populated.
    fs::set_permissions(dest, permissions).map_err(|e| Error::Permissions {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Copy one entry of any kind from `src` to `dest`, replacing what is there.
///
/// Directories are copied whole; whatever previously occupied `dest` is
/// removed first so the result mirrors `src` exactly. Missing parents of
/// `dest` are created.
pub fn copy_entry(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let metadata = fs::symlink_metadata(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    super::remove_entry(dest)?;

    let file_type = metadata.file_type();
    if file_type.is_dir() {
        copy_dir_all(src, dest)
    } else if file_type.is_symlink() {
        super::copy_symlink(src, dest)
    } else {
        fs::copy(src, dest).map(drop).map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_dir_all() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(src.join("subdir")).unwrap();
        fs::write(src.join("file.txt"), "data").unwrap();
        fs::write(src.join("subdir/nested.txt"), "nested").unwrap();
        std::os::unix::fs::symlink("missing-target", src.join("dangling")).unwrap();

        copy_dir_all(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("file.txt")).unwrap(), "data");
        assert_eq!(fs::read_to_string(dest.join("subdir/nested.txt")).unwrap(), "nested");
        assert_eq!(
            fs::read_link(dest.join("dangling")).unwrap(),
            Path::new("missing-target")
        );
    }

    #[test]
    fn test_copy_entry_file_overwrites() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("live.txt");
        let dest = dir.path().join("scratch/deep/live.txt");
        fs::write(&src, "live").unwrap();
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "from archive").unwrap();

        copy_entry(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "live");
    }

    #[test]
    fn test_copy_entry_directory_replaces_contents() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("live");
        let dest = dir.path().join("scratch/live");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("kept.txt"), "kept").unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.txt"), "stale").unwrap();

        copy_entry(&src, &dest).unwrap();

        assert!(dest.join("kept.txt").exists());
        assert!(!dest.join("stale.txt").exists());
    }
}
