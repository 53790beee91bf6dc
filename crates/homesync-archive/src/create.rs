//! Writing tar.gz snapshots of a subtree.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::{Error, Result};

/// Writes the subtree `base/root` to a gzip-compressed tar archive.
///
/// Member names are relative to `base`, so `root` itself is the top-level
/// entry. Exclusions are matched against those relative names exactly: an
/// excluded directory loses only its own entry, its descendants are still
/// visited and written.
#[derive(Clone, Debug)]
pub struct ArchiveBuilder {
    base: PathBuf,
    root: PathBuf,
    exclude: BTreeSet<PathBuf>,
}

/// What a finished archive contains, in write order.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    pub members: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl ArchiveBuilder {
    pub fn new(base: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            root: root.into(),
            exclude: BTreeSet::new(),
        }
    }

    pub fn exclude<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Write the archive to `dest`, which must not exist yet.
    ///
    /// The file is created with mode `0600` and flushed to disk before this
    /// returns.
    pub fn write_to(&self, dest: impl AsRef<Path>) -> Result<BuildReport> {
        use std::os::unix::fs::OpenOptionsExt;

        let dest = dest.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(dest)
            .map_err(|e| Error::Build {
                path: dest.to_path_buf(),
                source: e,
            })?;

        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        let mut report = BuildReport::default();
        self.append_tree(&mut builder, &self.root, &mut report)?;

        let build_err = |e| Error::Build {
            path: dest.to_path_buf(),
            source: e,
        };
        let mut writer = builder
            .into_inner()
            .map_err(build_err)?
            .finish()
            .map_err(build_err)?;
        writer.flush().map_err(build_err)?;
        let file = writer.into_inner().map_err(|e| build_err(e.into_error()))?;
        file.sync_all().map_err(build_err)?;

        Ok(report)
    }

    fn append_tree<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        relative: &Path,
        report: &mut BuildReport,
    ) -> Result<()> {
        let full = self.base.join(relative);
        let metadata = fs::symlink_metadata(&full).map_err(|e| Error::Build {
            path: full.clone(),
            source: e,
        })?;
        let file_type = metadata.file_type();

        if self.exclude.contains(relative) {
            tracing::debug!(path = %relative.display(), "excluded from archive");
            report.skipped.push(relative.to_path_buf());
        } else if file_type.is_dir() || file_type.is_file() || file_type.is_symlink() {
            builder
                .append_path_with_name(&full, relative)
                .map_err(|e| Error::Build {
                    path: full.clone(),
                    source: e,
                })?;
            report.members.push(relative.to_path_buf());
        } else {
            tracing::debug!(path = %full.display(), "skipping special file");
            report.skipped.push(relative.to_path_buf());
        }

        if file_type.is_dir() {
            let mut children = read_names(&full).map_err(|e| Error::Build {
                path: full.clone(),
                source: e,
            })?;
            children.sort();

            for name in children {
                self.append_tree(builder, &relative.join(name), report)?;
            }
        }

        Ok(())
    }
}

fn read_names(dir: &Path) -> std::io::Result<Vec<std::ffi::OsString>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn names(path: &Path) -> Vec<PathBuf> {
        let file = File::open(path).unwrap();
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
        let mut names: Vec<PathBuf> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_root_and_children() {
        let base = tempdir().unwrap();
        let root = base.path().join("subdir/dummy_files");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("test1.txt"), "Hi! 1").unwrap();
        fs::write(root.join("test2.txt"), "Hi! 2").unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("archive.tar.gz");

        let report = ArchiveBuilder::new(base.path(), "subdir/dummy_files")
            .write_to(&dest)
            .unwrap();

        assert_eq!(report.members.len(), 3);
        assert_eq!(report.members[0], Path::new("subdir/dummy_files"));
        assert_eq!(
            names(&dest),
            vec![
                PathBuf::from("subdir/dummy_files"),
                PathBuf::from("subdir/dummy_files/test1.txt"),
                PathBuf::from("subdir/dummy_files/test2.txt"),
            ]
        );
    }

    #[test]
    fn excluded_directory_keeps_descendants() {
        let base = tempdir().unwrap();
        let root = base.path().join("data");
        fs::create_dir_all(root.join("cache")).unwrap();
        fs::write(root.join("cache/blob"), "blob").unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("archive.tar.gz");

        ArchiveBuilder::new(base.path(), "data")
            .exclude(["data/cache"])
            .write_to(&dest)
            .unwrap();

        assert_eq!(
            names(&dest),
            vec![PathBuf::from("data"), PathBuf::from("data/cache/blob")]
        );
    }

    #[test]
    fn refuses_to_overwrite() {
        let base = tempdir().unwrap();
        fs::create_dir_all(base.path().join("data")).unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("archive.tar.gz");
        fs::write(&dest, "existing").unwrap();

        let result = ArchiveBuilder::new(base.path(), "data").write_to(&dest);
        assert!(matches!(result, Err(Error::Build { .. })));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "existing");
    }

    #[test]
    fn symlinks_are_not_followed() {
        let base = tempdir().unwrap();
        let root = base.path().join("data");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink("/etc/hostname", root.join("link")).unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("archive.tar.gz");

        ArchiveBuilder::new(base.path(), "data").write_to(&dest).unwrap();

        let file = File::open(&dest).unwrap();
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
        let link = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.path().unwrap().ends_with("link"))
            .unwrap();
        assert!(link.header().entry_type().is_symlink());
    }
}
