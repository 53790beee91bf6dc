use std::io::{self, Read};

use crate::{Digest, Hasher, Result, VerifyError};

/// Streaming reader that hashes data as it passes through.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self { reader, hasher }
    }
}

impl<R, H: Hasher> VerifiedReader<R, H> {
    /// Digest of everything read so far.
    pub fn into_digest(self) -> Digest {
        Digest::from_bytes(self.hasher.finalize())
    }

    /// Compare the digest of everything read so far with `expected`.
    pub fn finish(self, expected: &Digest) -> Result<()> {
        let actual = self.into_digest();
        if &actual == expected {
            Ok(())
        } else {
            Err(VerifyError::Mismatch {
                expected: expected.to_base64(),
                actual: actual.to_base64(),
            })
        }
    }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
        }
        Ok(n)
    }
}
