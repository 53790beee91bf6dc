use crate::{Error, Result};
use std::path::Path;

/// POSIX permission modes used by snapshots and restores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionMode {
    /// `0o600`: owner read/write, nothing for group or other.
    OwnerFile,

    /// `0o700`: owner read/write/traverse, nothing for group or other.
    OwnerDirectory,

    /// Explicit mode bits, e.g. taken from an archive header.
    Custom(u32),
}

impl PermissionMode {
    pub fn to_unix_mode(self) -> u32 {
        match self {
            Self::OwnerFile => 0o600,
            Self::OwnerDirectory => 0o700,
            Self::Custom(mode) => mode & 0o7777,
        }
    }

    /// Set the mode bits of `path`. Symlinks are followed.
    pub fn apply_to_path(self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let perms = std::fs::Permissions::from_mode(self.to_unix_mode());
        std::fs::set_permissions(path, perms).map_err(|e| Error::Permissions {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
pub(crate) fn mode_of(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(metadata.permissions().mode() & 0o7777)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_owner_modes() {
        assert_eq!(PermissionMode::OwnerFile.to_unix_mode(), 0o600);
        assert_eq!(PermissionMode::OwnerDirectory.to_unix_mode(), 0o700);
    }

    #[test]
    fn test_custom_mode_drops_file_type_bits() {
        assert_eq!(PermissionMode::Custom(0o100644).to_unix_mode(), 0o644);
    }

    #[test]
    fn test_apply_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret");
        std::fs::write(&path, "data").unwrap();

        PermissionMode::OwnerFile.apply_to_path(&path).unwrap();
        assert_eq!(mode_of(&path).unwrap(), 0o600);
    }

    #[test]
    fn test_apply_to_missing_path() {
        let dir = tempdir().unwrap();
        let result = PermissionMode::OwnerFile.apply_to_path(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::Permissions { .. })));
    }
}
