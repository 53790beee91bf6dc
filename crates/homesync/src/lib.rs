//! Snapshot a subtree of a home directory to a tar.gz archive and restore
//! it in place.
//!
//! # Architecture
//!
//! - `policy.rs` - validation of home-relative paths and archive members
//! - `snapshot.rs` - [`HomeArchive`], writing digest-stamped archives
//! - `restore.rs` - [`HomeArchiveRestoration`], the five phase replace
//! - `identity.rs` - the user whose home directory is involved
//! - `config.rs` - archive and scratch roots from TOML
//!
//! Filesystem primitives live in `homesync-fs`, archive reading and writing
//! in `homesync-archive` and digests in `homesync-verify`.
//!
//! # Deletion by omission
//!
//! A restore is a replace, not a merge. Files under the restored path that
//! are neither in the archive nor named as exclusions are deleted when the
//! new tree is swapped in.
//!
//! # Example
//!
//! ```no_run
//! use homesync::{Config, HomeArchive, HomeArchiveRestoration, Identity, RestoreOptions};
//!
//! # fn main() -> homesync::Result<()> {
//! let config = Config::default();
//! let identity = Identity::current()?;
//!
//! let created = HomeArchive::new(
//!     &identity,
//!     ".config/app",
//!     [".config/app/cache"],
//!     &config.archive_root,
//! )?
//! .create()?;
//! homesync::verify_archive(&created.path, &created.digest)?;
//!
//! let options = RestoreOptions::new(".config/app", &created.path)
//!     .scratch_root(&config.scratch_root)
//!     .exclude_paths([".config/app/local.toml"]);
//! HomeArchiveRestoration::new(&identity, options)?.replace()?;
//! # Ok(())
//! # }
//! ```

pub use config::Config;
pub use error::{Error, PathRole, Result};
pub use homesync_fs::TargetState;
pub use identity::Identity;
pub use policy::{RelativePath, validate_member, validate_relative};
pub use restore::{HomeArchiveRestoration, RestoreOptions, RestoreReport};
pub use snapshot::{CreatedArchive, HomeArchive, verify_archive};

pub mod config;
mod error;
mod identity;
pub mod policy;
pub mod restore;
pub mod snapshot;
