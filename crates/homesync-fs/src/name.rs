use std::path::{Path, PathBuf};

/// Build `<prefix>.<file name of path>-<token>`.
///
/// The token is a random 128-bit value, so two invocations naming the same
/// path never collide in practice.
pub fn unique_name(prefix: &str, path: impl AsRef<Path>) -> String {
    let file_name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{prefix}.{file_name}-{}", uuid::Uuid::new_v4().simple())
}

/// A uniquely named sibling of `path`, in the same parent directory.
pub fn unique_sibling(prefix: &str, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new(""));
    parent.join(unique_name(prefix, path))
}
