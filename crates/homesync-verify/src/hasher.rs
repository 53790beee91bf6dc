pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter for any RustCrypto [`digest::Digest`] implementation.
#[derive(Clone, Debug)]
pub struct DigestHasher<D: digest::Digest + Send>(D);

impl<D: digest::Digest + Send> DigestHasher<D> {
    pub fn new() -> Self {
        Self(D::new())
    }
}

impl<D: digest::Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: digest::Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) {
        digest::Digest::update(&mut self.0, data);
    }
    fn finalize(self) -> Vec<u8> {
        digest::Digest::finalize(self.0).to_vec()
    }
}

/// MD5, the digest recorded next to every archive.
pub type Md5Hasher = DigestHasher<md5::Md5>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hasher() {
        let mut hasher = Md5Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");

        let expected = hex::decode("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap();
        assert_eq!(hasher.finalize(), expected);
    }

    #[test]
    fn test_empty_input() {
        let expected = hex::decode("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        assert_eq!(Md5Hasher::default().finalize(), expected);
    }
}
