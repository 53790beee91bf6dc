use crate::{Error, Result};
use std::path::Path;

/// Whether the destination of a swap was occupied when the swap began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    /// Something (possibly a dangling symlink) occupied the destination.
    Present,
    Absent,
}

impl TargetState {
    pub fn of(path: impl AsRef<Path>) -> Result<Self> {
        Ok(if super::entry_exists(path)? {
            Self::Present
        } else {
            Self::Absent
        })
    }
}

/// Swap `src` into place at `dest`, parking the previous `dest` at `backup`.
///
/// All three paths must share a filesystem so each rename is one atomic
/// directory-entry operation; observers of `dest` see the old tree or the new
/// one, never a mix. When `dest` was present it is left at `backup` for the
/// caller to remove. If the second rename fails after the first succeeded,
/// [`Error::SwapInterrupted`] is returned and `backup` holds the old tree.
pub fn replace_dir(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    backup: impl AsRef<Path>,
) -> Result<TargetState> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let backup = backup.as_ref();

    let state = TargetState::of(dest)?;

    match state {
        TargetState::Present => {
            std::fs::rename(dest, backup).map_err(|e| Error::Rename {
                from: dest.to_path_buf(),
                to: backup.to_path_buf(),
                source: e,
            })?;
            std::fs::rename(src, dest).map_err(|e| Error::SwapInterrupted {
                target: dest.to_path_buf(),
                backup: backup.to_path_buf(),
                source: e,
            })?;
        }
        TargetState::Absent => {
            std::fs::rename(src, dest).map_err(|e| Error::Rename {
                from: src.to_path_buf(),
                to: dest.to_path_buf(),
                source: e,
            })?;
        }
    }

    Ok(state)
}
