//! Listing and contained unpacking of archives that are not trusted.
//!
//! Every member is checked against the archive root before anything is
//! written for it, and nothing is ever written through a symlink that an
//! earlier member planted inside the destination.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use homesync_fs::PermissionMode;

use crate::error::{Error, Result};
use crate::format::{self, ArchiveFormat, Decoder};
use crate::member::{Member, MemberKind};
use crate::sanitize::contain_member;

/// Read access to an archive file on disk.
///
/// The file is reopened for every pass, so members can be listed and
/// validated in full before the first byte is unpacked.
#[derive(Clone, Debug)]
pub struct ArchiveReader {
    path: PathBuf,
    format: ArchiveFormat,
}

/// Summary of an unpack.
#[derive(Clone, Debug, Default)]
pub struct ExtractReport {
    pub members: usize,
    pub total_bytes: u64,
    pub skipped: Vec<PathBuf>,
}

struct PendingDirectory {
    relative: PathBuf,
    path: PathBuf,
    mode: Option<u32>,
    mtime: Option<FileTime>,
}

impl ArchiveReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).map_err(|e| Error::ExtractionFailed {
            path: path.clone(),
            source: e,
        })?;
        let format = format::detect_from_reader(&mut file)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn archive(&self) -> Result<tar::Archive<Decoder<BufReader<File>>>> {
        let file = File::open(&self.path).map_err(|e| Error::ExtractionFailed {
            path: self.path.clone(),
            source: e,
        })?;
        let ArchiveFormat::Tar(codec) = self.format;
        Ok(tar::Archive::new(codec.decoder(BufReader::new(file))))
    }

    /// Every member header, in archive order. Nothing is written.
    pub fn members(&self) -> Result<Vec<Member>> {
        let mut archive = self.archive()?;
        let mut members = Vec::new();
        for entry in archive.entries().map_err(corrupted)? {
            let entry = entry.map_err(corrupted)?;
            members.push(read_member(&entry)?);
        }
        Ok(members)
    }

    /// Unpack every member into `destination`, requiring each to lie under
    /// `root`.
    ///
    /// Members keep their archive-relative paths, so `root` ends up at
    /// `destination/root`. Directory modes and times are applied once all
    /// members are written. Setuid, setgid and sticky bits are dropped.
    pub fn unpack_within(&self, destination: &Path, root: &Path) -> Result<ExtractReport> {
        let mut archive = self.archive()?;
        let mut report = ExtractReport::default();
        let mut directories = Vec::new();

        for entry in archive.entries().map_err(corrupted)? {
            let mut entry = entry.map_err(corrupted)?;
            let member = read_member(&entry)?;
            let relative = contain_member(&member.path, root)?;
            ensure_no_symlink_ancestor(destination, &relative)?;

            let target = destination.join(&relative);
            let mtime = entry
                .header()
                .mtime()
                .ok()
                .map(|t| FileTime::from_unix_time(t as i64, 0));

            match &member.kind {
                MemberKind::Directory => {
                    ensure_real_directory(&target)?;
                    directories.push(PendingDirectory {
                        relative: relative.clone(),
                        path: target,
                        mode: member.mode,
                        mtime,
                    });
                }
                MemberKind::File => {
                    write_file(&mut entry, &target, member.mode, mtime)?;
                    report.total_bytes += member.size;
                }
                MemberKind::Symlink { target: link } => write_symlink(link, &target)?,
                MemberKind::HardLink { target: link } => {
                    let source = contain_member(link, root)?;
                    ensure_no_symlink_ancestor(destination, &source)?;
                    write_hard_link(&destination.join(source), &target)?;
                }
                MemberKind::Other => {
                    tracing::debug!(member = %member.path.display(), "skipping special member");
                    report.skipped.push(member.path);
                    continue;
                }
            }
            report.members += 1;
        }

        // Deepest first, so a read-only parent never blocks fixing a child.
        directories.sort_by_key(|d| std::cmp::Reverse(d.path.components().count()));
        for dir in &directories {
            // A later member may have replaced the directory or an ancestor
            // with a link.
            ensure_no_symlink_ancestor(destination, &dir.relative)?;
            if !is_real_directory(&dir.path)? {
                tracing::debug!(path = %dir.path.display(), "directory replaced, metadata skipped");
                continue;
            }
            if let Some(mode) = dir.mode {
                PermissionMode::Custom(mode & 0o777).apply_to_path(&dir.path)?;
            }
            if let Some(mtime) = dir.mtime {
                filetime::set_file_mtime(&dir.path, mtime).map_err(|e| Error::ExtractionFailed {
                    path: dir.path.clone(),
                    source: e,
                })?;
            }
        }

        Ok(report)
    }
}

fn corrupted(source: io::Error) -> Error {
    Error::Corrupted { source }
}

fn read_member<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Member> {
    let path = entry.path().map_err(corrupted)?.into_owned();
    let header = entry.header();
    Ok(Member {
        path,
        size: header.size().unwrap_or(0),
        mode: header.mode().ok(),
        kind: MemberKind::from_header(entry).map_err(corrupted)?,
    })
}

/// Refuse `relative` when any existing proper ancestor inside `destination`
/// is a symlink.
pub fn ensure_no_symlink_ancestor(destination: &Path, relative: &Path) -> Result<()> {
    let mut current = destination.to_path_buf();
    let mut components = relative.components().peekable();

    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(m) if m.file_type().is_symlink() => {
                return Err(Error::SymlinkAncestor { path: current });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn is_real_directory(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(m) => Ok(m.file_type().is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Create `path` as a directory, removing a symlink or file already there.
fn ensure_real_directory(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(m) if m.file_type().is_dir() => Ok(()),
        Ok(_) => {
            homesync_fs::remove_entry(path)?;
            create_dir(path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_dir(path),
        Err(e) => Err(Error::Io(e)),
    }
}

fn prepare_target(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    homesync_fs::remove_entry(target)?;
    Ok(())
}

fn write_file<R: Read>(
    reader: &mut R,
    target: &Path,
    mode: Option<u32>,
    mtime: Option<FileTime>,
) -> Result<()> {
    prepare_target(target)?;

    let failed = |e| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source: e,
    };
    let mut file = File::create(target).map_err(failed)?;
    io::copy(reader, &mut file).map_err(failed)?;
    drop(file);

    PermissionMode::Custom(mode.unwrap_or(0o644) & 0o777).apply_to_path(target)?;
    if let Some(mtime) = mtime {
        filetime::set_file_mtime(target, mtime).map_err(failed)?;
    }
    Ok(())
}

fn write_symlink(link_target: &Path, link: &Path) -> Result<()> {
    prepare_target(link)?;
    std::os::unix::fs::symlink(link_target, link).map_err(|e| Error::ExtractionFailed {
        path: link.to_path_buf(),
        source: e,
    })
}

fn write_hard_link(source: &Path, link: &Path) -> Result<()> {
    prepare_target(link)?;
    fs::hard_link(source, link).map_err(|e| Error::ExtractionFailed {
        path: link.to_path_buf(),
        source: e,
    })
}
