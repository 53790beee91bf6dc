//! Digest primitives for snapshot archives.
//!
//! Archives are hashed once, as a whole file, right after they are written.
//! The digest travels with the archive out of band and can be checked again
//! before a restore.
//!
//! # Example
//!
//! ```
//! use homesync_verify::{Digest, Md5Hasher, VerifiedReader};
//! use std::io::Read;
//!
//! let expected = Digest::of_bytes::<Md5Hasher>(b"hello world");
//!
//! let mut reader = VerifiedReader::new(&b"hello world"[..], Md5Hasher::new());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! reader.finish(&expected).unwrap();
//! ```

pub use self::checksum::{Digest, digest_file, verify_file};
pub use self::error::{Result, VerifyError};
pub use self::hasher::{DigestHasher, Hasher, Md5Hasher};
pub use self::reader::VerifiedReader;

mod checksum;
mod error;
mod hasher;
mod reader;
