use std::path::PathBuf;

/// One entry of an archive, as recorded in its header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: MemberKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    Symlink { target: PathBuf },
    HardLink { target: PathBuf },
    /// FIFOs, device nodes and anything else a restore does not recreate.
    Other,
}

impl MemberKind {
    pub(crate) fn from_header<R: std::io::Read>(entry: &tar::Entry<'_, R>) -> std::io::Result<Self> {
        let entry_type = entry.header().entry_type();
        let kind = if entry_type.is_dir() {
            Self::Directory
        } else if entry_type.is_symlink() || entry_type.is_hard_link() {
            let target = entry
                .link_name()?
                .map(|t| t.into_owned())
                .ok_or_else(|| std::io::Error::other("link entry without a target"))?;
            if entry_type.is_symlink() {
                Self::Symlink { target }
            } else {
                Self::HardLink { target }
            }
        } else if entry_type.is_file() || entry_type.is_contiguous() || entry_type.is_gnu_sparse() {
            Self::File
        } else {
            Self::Other
        };
        Ok(kind)
    }
}
