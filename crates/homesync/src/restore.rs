//! In-place restoration of a home directory subtree from an archive.
//!
//! The restore rebuilds the target in a private scratch tree, stages it
//! next to the live path and swaps it in with two renames. Anything under
//! the live path that is neither in the archive nor listed as an exclusion
//! is deleted by the swap.

use std::path::{Path, PathBuf};

use homesync_archive::{ArchiveReader, ensure_no_symlink_ancestor};
use homesync_fs::{
    ScratchDir, TargetState, copy_entry, create_missing_dirs, entry_exists, move_path,
    remove_created_dirs, remove_entry,
};
use tracing::{debug, info, warn};

use crate::error::{Error, PathRole, Result};
use crate::identity::Identity;
use crate::policy::{RelativePath, validate_all, validate_member, validate_relative};

const STAGING_PREFIX: &str = ".archive-restore-new";
const BACKUP_PREFIX: &str = ".archive-restore-old";

/// Inputs of a restore, all relative to the home directory except the
/// archive and scratch root.
#[derive(Clone, Debug)]
pub struct RestoreOptions {
    store_path: PathBuf,
    filesystem_path: PathBuf,
    archive_path: PathBuf,
    scratch_root: PathBuf,
    exclude_paths: Vec<PathBuf>,
}

impl RestoreOptions {
    /// Restore `store_path` from `archive_path` onto the same home path.
    pub fn new(store_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        let store_path = store_path.into();
        Self {
            filesystem_path: store_path.clone(),
            store_path,
            archive_path: archive_path.into(),
            scratch_root: std::env::temp_dir(),
            exclude_paths: Vec::new(),
        }
    }

    /// Home-relative path to replace, when it differs from the store path.
    pub fn filesystem_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.filesystem_path = path.into();
        self
    }

    /// Parent of the scratch tree. May be on a different filesystem.
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    /// Live paths to carry over unchanged, relative to the home directory.
    pub fn exclude_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_paths.extend(paths.into_iter().map(Into::into));
        self
    }
}

/// Outcome of a completed restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    /// Whether the live path existed when the swap began.
    pub target_state: TargetState,
    /// Members unpacked from the archive.
    pub members: usize,
    /// Exclusions that existed and were carried into the new tree.
    pub preserved: Vec<RelativePath>,
}

/// A single pending restore of one live path.
///
/// Construction validates every path and creates the scratch tree. The
/// live path is not touched until [`replace`](Self::replace) commits.
///
/// # Deletion by omission
///
/// After a successful replace the live path holds exactly the archived
/// subtree plus the existing exclusions. Local files covered by neither are
/// gone.
#[derive(Debug)]
pub struct HomeArchiveRestoration {
    home_directory: PathBuf,
    store_path: RelativePath,
    filesystem_relative: RelativePath,
    filesystem_path: PathBuf,
    archive_path: PathBuf,
    exclude_paths: Vec<RelativePath>,
    scratch: ScratchDir,
    staging_path: PathBuf,
    backup_path: PathBuf,
}

impl HomeArchiveRestoration {
    pub fn new(identity: &Identity, options: RestoreOptions) -> Result<Self> {
        let store_path = validate_relative(&options.store_path, PathRole::Store)?;
        let filesystem_relative = validate_relative(&options.filesystem_path, PathRole::Filesystem)?;
        let exclude_paths = validate_all(&options.exclude_paths, PathRole::Exclude)?;

        let home_directory = identity.home_directory().to_path_buf();
        let filesystem_path = home_directory.join(filesystem_relative.as_path());
        let scratch = ScratchDir::new(&options.scratch_root, &filesystem_path)?;

        Ok(Self {
            staging_path: homesync_fs::unique_sibling(STAGING_PREFIX, &filesystem_path),
            backup_path: homesync_fs::unique_sibling(BACKUP_PREFIX, &filesystem_path),
            home_directory,
            store_path,
            filesystem_relative,
            filesystem_path,
            archive_path: options.archive_path,
            exclude_paths,
            scratch,
        })
    }

    pub fn filesystem_path(&self) -> &Path {
        &self.filesystem_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Replace the live path with the archive's store path subtree.
    ///
    /// Fails without touching the live path if any member lies outside the
    /// store path or anything before the swap goes wrong. Missing parent
    /// directories of the live path are created just before staging and
    /// removed again if staging or the swap fails. If the swap is
    /// interrupted after the live tree was moved aside, the error carries
    /// the backup location.
    pub fn replace(self) -> Result<RestoreReport> {
        info!(
            target = %self.filesystem_path.display(),
            archive = %self.archive_path.display(),
            "restoring home archive"
        );

        let result = self.run();

        let Self { scratch, .. } = self;
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %scratch_path.display(), error = %e, "failed to remove scratch tree");
        }

        if let Ok(report) = &result {
            info!(
                target = %self.filesystem_path.display(),
                members = report.members,
                preserved = report.preserved.len(),
                "home archive restored"
            );
        }
        result
    }

    fn run(&self) -> Result<RestoreReport> {
        let members = self.extract()?;
        let preserved = self.merge_exclusions()?;

        let created = self.create_parents()?;
        let committed = self.stage().and_then(|()| {
            homesync_fs::replace_dir(&self.staging_path, &self.filesystem_path, &self.backup_path)
                .map_err(Error::from)
        });
        let target_state = match committed {
            Ok(state) => state,
            Err(e) => {
                self.roll_back(&created);
                return Err(e);
            }
        };
        debug!(state = ?target_state, "swap committed");

        if target_state == TargetState::Present {
            remove_entry(&self.backup_path)?;
            debug!(path = %self.backup_path.display(), "backup removed");
        }

        Ok(RestoreReport {
            target_state,
            members,
            preserved,
        })
    }

    /// Validate every member, then unpack the archive into scratch.
    fn extract(&self) -> Result<usize> {
        let reader = ArchiveReader::open(&self.archive_path)?;

        let members = reader.members()?;
        for member in &members {
            validate_member(&member.path, &self.store_path)?;
        }
        debug!(members = members.len(), "archive members validated");

        let report = reader.unpack_within(self.scratch.path(), self.store_path.as_path())?;
        debug!(
            members = report.members,
            bytes = report.total_bytes,
            scratch = %self.scratch.path().display(),
            "archive unpacked"
        );
        Ok(report.members)
    }

    /// Copy existing live exclusions over the unpacked tree.
    fn merge_exclusions(&self) -> Result<Vec<RelativePath>> {
        let mut preserved = Vec::new();

        for exclusion in &self.exclude_paths {
            let Some(within) = exclusion.strip_prefix(&self.filesystem_relative) else {
                debug!(path = %exclusion, "exclusion outside restored path");
                continue;
            };

            let live = self.home_directory.join(exclusion.as_path());
            if !entry_exists(&live)? {
                debug!(path = %exclusion, "exclusion not present");
                continue;
            }

            let relative = if within.as_os_str().is_empty() {
                self.store_path.as_path().to_path_buf()
            } else {
                self.store_path.as_path().join(within)
            };
            ensure_no_symlink_ancestor(self.scratch.path(), &relative)?;
            copy_entry(&live, self.scratch.path().join(&relative))?;

            debug!(path = %exclusion, "exclusion preserved");
            preserved.push(exclusion.clone());
        }

        Ok(preserved)
    }

    /// Move the rebuilt tree next to the live path.
    fn stage(&self) -> Result<()> {
        let rebuilt = self.scratch.path().join(self.store_path.as_path());
        if !entry_exists(&rebuilt)? {
            debug!("archive has no store path entry, staging an empty tree");
            std::fs::create_dir_all(&rebuilt).map_err(|e| homesync_fs::Error::Write {
                path: rebuilt.clone(),
                source: e,
            })?;
        }

        move_path(&rebuilt, &self.staging_path)?;
        debug!(path = %self.staging_path.display(), "tree staged");
        Ok(())
    }

    /// Missing ancestors of the live path, created so staging can sit next
    /// to it.
    fn create_parents(&self) -> Result<Vec<PathBuf>> {
        let Some(parent) = self.filesystem_path.parent() else {
            return Ok(Vec::new());
        };
        let created = create_missing_dirs(parent)?;
        if !created.is_empty() {
            debug!(count = created.len(), "created missing parents of target");
        }
        Ok(created)
    }

    /// Drop staging and any parents created for it after a failed stage or
    /// commit.
    fn roll_back(&self, created: &[PathBuf]) {
        if let Err(e) = remove_entry(&self.staging_path) {
            warn!(path = %self.staging_path.display(), error = %e, "failed to remove staging tree");
        }
        remove_created_dirs(created);
    }
}
