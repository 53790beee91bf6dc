use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_ARCHIVE_ROOT: &str = "/var/tmp/homesync/archives";

/// Directory roots shared by snapshots and restores.
///
/// ```toml
/// archive_root = "/srv/homesync/archives"
/// scratch_root = "/var/tmp"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Archives are written to `<archive_root>/<username>/`.
    pub archive_root: PathBuf,
    /// Parent of the private scratch tree used while restoring.
    pub scratch_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            scratch_root: std::env::temp_dir(),
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }
}
