//! Point-in-time archives of a home directory subtree.

use std::path::{Path, PathBuf};

use homesync_archive::ArchiveBuilder;
use homesync_fs::PermissionMode;
use homesync_verify::{Digest, Md5Hasher, digest_file, verify_file};
use tracing::{debug, info, warn};

use crate::error::{Error, PathRole, Result};
use crate::identity::Identity;
use crate::policy::{RelativePath, validate_all, validate_relative};

const ARCHIVE_PREFIX: &str = "archive-";
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Snapshot builder for one store path of one user.
///
/// Every [`create`](Self::create) writes a new archive under
/// `<archive_root>/<username>/`, so successive snapshots never overwrite
/// each other.
#[derive(Clone, Debug)]
pub struct HomeArchive {
    username: String,
    home_directory: PathBuf,
    store_path: RelativePath,
    exclude_paths: Vec<RelativePath>,
    archive_root: PathBuf,
}

/// A finished archive and the base64 MD5 of its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedArchive {
    pub path: PathBuf,
    pub digest: String,
}

impl HomeArchive {
    /// Validates the store path and exclusions. Touches nothing on disk.
    pub fn new<I, P>(
        identity: &Identity,
        store_path: impl AsRef<Path>,
        exclude_paths: I,
        archive_root: impl Into<PathBuf>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Ok(Self {
            username: identity.username().to_owned(),
            home_directory: identity.home_directory().to_path_buf(),
            store_path: validate_relative(store_path, PathRole::Store)?,
            exclude_paths: validate_all(exclude_paths, PathRole::Exclude)?,
            archive_root: archive_root.into(),
        })
    }

    pub fn store_path(&self) -> &RelativePath {
        &self.store_path
    }

    pub fn exclude_paths(&self) -> &[RelativePath] {
        &self.exclude_paths
    }

    /// Directory holding this user's archives.
    pub fn archive_directory(&self) -> PathBuf {
        self.archive_root.join(&self.username)
    }

    /// Write a new archive of `home/store_path`.
    pub fn create(&self) -> Result<CreatedArchive> {
        let directory = self.archive_directory();
        std::fs::create_dir_all(&directory).map_err(|e| homesync_fs::Error::Write {
            path: directory.clone(),
            source: e,
        })?;

        let token = uuid::Uuid::new_v4().simple().to_string();
        let path = directory.join(format!("{ARCHIVE_PREFIX}{token}{ARCHIVE_SUFFIX}"));

        info!(
            store = %self.store_path,
            archive = %path.display(),
            "creating home archive"
        );

        let builder = ArchiveBuilder::new(&self.home_directory, self.store_path.as_path())
            .exclude(self.exclude_paths.iter().map(|p| p.as_path().to_path_buf()));

        let report = match builder.write_to(&path) {
            Ok(report) => report,
            Err(e) => {
                discard_partial(&path);
                return Err(e.into());
            }
        };
        debug!(
            members = report.members.len(),
            skipped = report.skipped.len(),
            "archive written"
        );

        PermissionMode::OwnerFile.apply_to_path(&path)?;
        let digest = digest_file::<Md5Hasher>(&path)?.to_base64();

        info!(archive = %path.display(), digest = %digest, "home archive created");
        Ok(CreatedArchive { path, digest })
    }
}

fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial archive"),
    }
}

/// Recompute the MD5 of `path` and compare it with a base64 `digest`.
pub fn verify_archive(path: impl AsRef<Path>, digest: &str) -> Result<()> {
    let expected = Digest::from_base64(digest)?;
    verify_file::<Md5Hasher>(path, &expected).map_err(Error::from)
}
