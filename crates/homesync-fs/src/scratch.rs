use crate::permissions::PermissionMode;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

const SCRATCH_PREFIX: &str = ".archive-restore-tmp";

/// A private directory owned by a single restore.
///
/// Created with mode `0700` under a caller-chosen root, which may live on a
/// different filesystem than the tree being restored. Removed when closed or
/// dropped.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    removed: bool,
}

impl ScratchDir {
    /// Create `<root>/.archive-restore-tmp.<file name of for_path>-<token>`.
    pub fn new(root: impl AsRef<Path>, for_path: impl AsRef<Path>) -> Result<Self> {
        use std::os::unix::fs::DirBuilderExt;

        let path = root
            .as_ref()
            .join(crate::unique_name(SCRATCH_PREFIX, for_path));

        std::fs::DirBuilder::new()
            .mode(PermissionMode::OwnerDirectory.to_unix_mode())
            .create(&path)
            .map_err(|e| Error::Write {
                path: path.clone(),
                source: e,
            })?;

        let scratch = Self {
            path,
            removed: false,
        };
        // The umask cannot widen 0700, but a restrictive one may narrow it.
        PermissionMode::OwnerDirectory.apply_to_path(&scratch.path)?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the scratch tree now, reporting failure.
    pub fn close(mut self) -> Result<()> {
        self.removed = true;
        crate::remove_entry(&self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = crate::remove_entry(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch tree");
        }
    }
}
