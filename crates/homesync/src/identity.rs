use std::path::{Path, PathBuf};

use nix::unistd::{User, getuid};

use crate::error::{Error, Result};

/// The user whose home directory is archived or restored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    username: String,
    home_directory: PathBuf,
}

impl Identity {
    pub fn new(username: impl Into<String>, home_directory: impl Into<PathBuf>) -> Self {
        Self {
            username: username.into(),
            home_directory: home_directory.into(),
        }
    }

    /// Resolve the invoking user.
    ///
    /// The user name comes from the passwd entry of the real uid. The home
    /// directory honours `$HOME` first and falls back to the passwd entry.
    pub fn current() -> Result<Self> {
        let user = User::from_uid(getuid()).ok().flatten();

        let username = user
            .as_ref()
            .map(|u| u.name.clone())
            .filter(|name| !name.is_empty())
            .ok_or(Error::IdentityUnresolved("user name"))?;

        let home_directory = home::home_dir()
            .filter(|dir| dir.is_absolute())
            .or_else(|| user.map(|u| u.dir).filter(|dir| dir.is_absolute()))
            .ok_or(Error::IdentityUnresolved("home directory"))?;

        Ok(Self {
            username,
            home_directory,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }
}
