use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive member '{member}' is outside the archive root (offending segment '{member_name}')")]
    IllegalMember { member_name: String, member: PathBuf },

    #[error("refusing to write through symlink at '{path}'")]
    SymlinkAncestor { path: PathBuf },

    #[error("archive is corrupted: {source}")]
    Corrupted { source: io::Error },

    #[error("failed to add '{path}' to archive: {source}")]
    Build { path: PathBuf, source: io::Error },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] homesync_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
