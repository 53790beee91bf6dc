//! Validation of caller-supplied paths and of archive members.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, PathRole, Result};

/// A path relative to the home directory.
///
/// Never absolute, never containing `..`, never empty. `.` components and
/// trailing separators are dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// The part of this path below `base`, if it lies at or under it.
    pub fn strip_prefix(&self, base: &RelativePath) -> Option<&Path> {
        self.0.strip_prefix(&base.0).ok()
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

/// Validate `path` in the given role. No filesystem access.
pub fn validate_relative(path: impl AsRef<Path>, role: PathRole) -> Result<RelativePath> {
    let path = path.as_ref();

    if path.is_absolute() || path.has_root() {
        return Err(Error::NotRelative {
            role,
            path: path.to_path_buf(),
        });
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::EscapesHome {
                    role,
                    path: path.to_path_buf(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::NotRelative {
                    role,
                    path: path.to_path_buf(),
                });
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::EmptyPath { role });
    }

    Ok(RelativePath(normalized))
}

pub fn validate_all<I, P>(paths: I, role: PathRole) -> Result<Vec<RelativePath>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|p| validate_relative(p, role))
        .collect()
}

/// Accept an archive member only if it is the store path or lies under it.
///
/// Rejections carry the member's top-level segment as `member_name`.
pub fn validate_member(member: impl AsRef<Path>, store_path: &RelativePath) -> Result<()> {
    homesync_archive::contain_member(member, store_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RelativePath {
        validate_relative("subdir/dummy_files", PathRole::Store).unwrap()
    }

    #[test]
    fn relative_paths_are_normalized() {
        let path = validate_relative("./subdir/./dummy_files/", PathRole::Store).unwrap();
        assert_eq!(path.as_path(), Path::new("subdir/dummy_files"));
    }

    #[test]
    fn absolute_path_reports_role() {
        let err = validate_relative("/subdir/dummy_files", PathRole::Filesystem).unwrap_err();
        assert!(matches!(
            err,
            Error::NotRelative {
                role: PathRole::Filesystem,
                ..
            }
        ));
    }

    #[test]
    fn parent_components_rejected() {
        let err = validate_relative("subdir/../../etc", PathRole::Exclude).unwrap_err();
        assert!(matches!(err, Error::EscapesHome { role: PathRole::Exclude, .. }));
    }

    #[test]
    fn empty_rejected() {
        assert!(matches!(
            validate_relative(".", PathRole::Store),
            Err(Error::EmptyPath { role: PathRole::Store })
        ));
        assert!(matches!(
            validate_relative("", PathRole::Store),
            Err(Error::EmptyPath { .. })
        ));
    }

    #[test]
    fn members_under_store_path() {
        validate_member("subdir/dummy_files", &store()).unwrap();
        validate_member("subdir/dummy_files/test1.txt", &store()).unwrap();
        validate_member("subdir/dummy_files/nested/deep.txt", &store()).unwrap();
    }

    #[test]
    fn foreign_member_named_by_top_segment() {
        let err = validate_member("unexpected/file.txt", &store()).unwrap_err();
        assert!(matches!(err, Error::IllegalMember { ref member_name } if member_name == "unexpected"));
    }

    #[test]
    fn traversing_member_rejected() {
        assert!(validate_member("subdir/dummy_files/../../x", &store()).is_err());
        assert!(validate_member("/subdir/dummy_files/x", &store()).is_err());
    }

    #[test]
    fn strip_prefix_of_exclusion() {
        let exclusion =
            validate_relative("subdir/dummy_files/keep.txt", PathRole::Exclude).unwrap();
        assert_eq!(exclusion.strip_prefix(&store()), Some(Path::new("keep.txt")));

        let outside = validate_relative("other/keep.txt", PathRole::Exclude).unwrap();
        assert_eq!(outside.strip_prefix(&store()), None);
    }
}
