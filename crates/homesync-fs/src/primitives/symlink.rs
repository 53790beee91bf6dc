use crate::{Error, Result};
use std::path::Path;

/// Recreate the symlink at `src` as `dest`, target unchanged.
///
/// The target is never resolved, so dangling links copy like any other.
/// An existing entry at `dest` is replaced.
pub fn copy_symlink(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let target = std::fs::read_link(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;

    super::remove_entry(dest)?;

    std::os::unix::fs::symlink(&target, dest).map_err(|e| Error::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_dangling_symlink() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::os::unix::fs::symlink("does/not/exist", &src).unwrap();

        copy_symlink(&src, &dest).unwrap();

        assert!(dest.is_symlink());
        assert_eq!(std::fs::read_link(&dest).unwrap(), Path::new("does/not/exist"));
    }

    #[test]
    fn test_copy_symlink_replaces_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::os::unix::fs::symlink("elsewhere", &src).unwrap();
        std::fs::write(&dest, "old").unwrap();

        copy_symlink(&src, &dest).unwrap();
        assert_eq!(std::fs::read_link(&dest).unwrap(), Path::new("elsewhere"));
    }
}
