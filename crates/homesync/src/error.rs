use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which caller-supplied path a validation error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathRole {
    Store,
    Filesystem,
    Exclude,
}

impl fmt::Display for PathRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Store => "store path",
            Self::Filesystem => "filesystem path",
            Self::Exclude => "exclude path",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{role} '{path}' must be relative to the home directory")]
    NotRelative { role: PathRole, path: PathBuf },

    #[error("{role} '{path}' must not leave the home directory")]
    EscapesHome { role: PathRole, path: PathBuf },

    #[error("{role} must not be empty")]
    EmptyPath { role: PathRole },

    #[error("archive member '{member_name}' is not under the store path")]
    IllegalMember { member_name: String },

    #[error("could not resolve the invoking user's {0}")]
    IdentityUnresolved(&'static str),

    #[error(
        "restore of '{target}' interrupted, previous tree left at '{backup_path}': {source}"
    )]
    CommitInterrupted {
        target: PathBuf,
        backup_path: PathBuf,
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Fs(homesync_fs::Error),

    #[error(transparent)]
    Archive(homesync_archive::Error),

    #[error(transparent)]
    Verify(#[from] homesync_verify::VerifyError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<homesync_fs::Error> for Error {
    fn from(e: homesync_fs::Error) -> Self {
        match e {
            homesync_fs::Error::SwapInterrupted {
                target,
                backup,
                source,
            } => Self::CommitInterrupted {
                target,
                backup_path: backup,
                source,
            },
            other => Self::Fs(other),
        }
    }
}

impl From<homesync_archive::Error> for Error {
    fn from(e: homesync_archive::Error) -> Self {
        match e {
            homesync_archive::Error::IllegalMember { member_name, .. } => {
                Self::IllegalMember { member_name }
            }
            homesync_archive::Error::Fs(inner) => inner.into(),
            other => Self::Archive(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_in_message() {
        let err = Error::NotRelative {
            role: PathRole::Filesystem,
            path: PathBuf::from("/subdir"),
        };
        assert_eq!(
            err.to_string(),
            "filesystem path '/subdir' must be relative to the home directory"
        );
    }

    #[test]
    fn illegal_member_keeps_segment() {
        let err: Error = homesync_archive::Error::IllegalMember {
            member_name: "unexpected".into(),
            member: PathBuf::from("unexpected/file.txt"),
        }
        .into();
        assert!(matches!(err, Error::IllegalMember { ref member_name } if member_name == "unexpected"));
    }

    #[test]
    fn interrupted_swap_becomes_commit_error() {
        let err: Error = homesync_fs::Error::SwapInterrupted {
            target: PathBuf::from("/home/u/data"),
            backup: PathBuf::from("/home/u/.archive-restore-old.data-x"),
            source: io::Error::other("boom"),
        }
        .into();
        assert!(matches!(err, Error::CommitInterrupted { .. }));
    }
}
