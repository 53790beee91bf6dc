use crate::{Error, Result};
use std::path::Path;

/// Move `src` to `dest`.
///
/// A plain rename when both sit on the same filesystem; across devices the
/// entry is copied and the source removed afterwards.
pub fn move_path(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %src.display(),
                to = %dest.display(),
                "rename crosses devices, copying instead"
            );
            copy_then_remove(src, dest)
        }
        Err(e) => Err(Error::Rename {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source: e,
        }),
    }
}

/// Cross-device half of [`move_path`]. The source goes only once the copy
/// is complete.
fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    super::copy_entry(src, dest)?;
    super::remove_entry(src)
}
