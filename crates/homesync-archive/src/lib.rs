//! Tar.gz snapshots of a directory subtree and their contained extraction.
//!
//! # Architecture
//!
//! - `format.rs` - Format detection and decoders
//! - `sanitize.rs` - Member containment (zip-slip prevention)
//! - `create.rs` - Archive writing with exact-path exclusion
//! - `extract.rs` - Member listing and contained unpacking
//! - `member.rs` - Shared member types

pub use create::{ArchiveBuilder, BuildReport};
pub use error::{Error, Result};
pub use extract::{ArchiveReader, ExtractReport, ensure_no_symlink_ancestor};
pub use format::{ArchiveFormat, TarCompress};
pub use member::{Member, MemberKind};
pub use sanitize::{contain_member, top_level_segment};

mod create;
mod error;
mod extract;
pub mod format;
mod member;
mod sanitize;
