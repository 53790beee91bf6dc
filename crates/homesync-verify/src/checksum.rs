use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{Hasher, Result, VerifyError};

/// Raw digest bytes of a whole file.
///
/// Rendered base64 (standard alphabet, padded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|_| VerifyError::InvalidDigest(encoded.to_owned()))
    }

    pub fn of_bytes<H: Hasher + Default>(data: &[u8]) -> Self {
        let mut hasher = H::default();
        hasher.update(data);
        Self(hasher.finalize())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Hash the complete contents of the file at `path`.
pub fn digest_file<H: Hasher + Default>(path: impl AsRef<Path>) -> Result<Digest> {
    let file = File::open(path.as_ref())?;
    let mut reader = crate::VerifiedReader::new(file, H::default());
    io::copy(&mut reader, &mut io::sink())?;
    Ok(reader.into_digest())
}

/// Recompute the digest of `path` and compare it with `expected`.
pub fn verify_file<H: Hasher + Default>(path: impl AsRef<Path>, expected: &Digest) -> Result<()> {
    let file = File::open(path.as_ref())?;
    let mut reader = crate::VerifiedReader::new(file, H::default());
    let mut buffer = [0u8; 8192];
    while reader.read(&mut buffer)? != 0 {}
    reader.finish(expected)
}
