//! Filesystem primitives behind home directory snapshots and restores.
//!
//! # Architecture
//!
//! - `primitives/` - copy, move, remove and the two-rename directory swap
//! - `permissions.rs` - owner-only mode handling
//! - `scratch.rs` - private scratch directories removed on drop
//! - `name.rs` - collision-resistant sibling names
//!
//! Only POSIX semantics are supported: renames are expected to be atomic
//! directory-entry operations when source and destination share a parent.

pub use error::{Error, Result};
pub use name::{unique_name, unique_sibling};
pub use permissions::PermissionMode;
pub use primitives::{
    TargetState, copy_dir_all, copy_entry, copy_symlink, create_missing_dirs, entry_exists,
    move_path, remove_created_dirs, remove_entry, replace_dir,
};
pub use scratch::ScratchDir;

mod error;
mod name;
pub mod permissions;
pub mod primitives;
mod scratch;
