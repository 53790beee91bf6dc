use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Check that `member` lies at or under `root` and return it normalized.
///
/// `root` is a relative path such as `subdir/dummy_files`. The member is
/// accepted only when it is relative, contains no `..` component and its
/// leading components equal those of `root`. The check is made on the raw
/// header path, before any joining with a destination directory.
pub fn contain_member(member: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<PathBuf> {
    let member = member.as_ref();
    let root = root.as_ref();

    let mut normalized = PathBuf::new();
    for component in member.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(illegal(member));
            }
        }
    }

    let root_components = root
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    let mut member_components = normalized.components();
    for expected in root_components {
        if member_components.next() != Some(expected) {
            return Err(illegal(member));
        }
    }

    Ok(normalized)
}

/// First meaningful segment of `path`, for error reports.
///
/// `unexpected/file.txt` gives `unexpected`, `/etc/passwd` gives `/` and
/// `../x` gives `..`.
pub fn top_level_segment(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .components()
        .find(|c| !matches!(c, Component::CurDir))
        .map(|c| match c {
            Component::RootDir => "/".to_owned(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .unwrap_or_default()
}

fn illegal(member: &Path) -> Error {
    Error::IllegalMember {
        member_name: top_level_segment(member),
        member: member.to_path_buf(),
    }
}
