use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::KitError;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

/// Reader or writer that hashes every byte going through it
#[derive(Debug)]
pub struct Checksum<T> {
    inner: T,
    digest: Sha1,
    consumed: usize,
}

impl<T> Checksum<T> {
    pub fn new(inner: T) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
            consumed: 0,
        }
    }

    /// Number of bytes hashed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn digest(&self) -> [u8; CHECKSUM_SIZE] {
        self.digest.clone().finalize().into()
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<R: Read> Checksum<R> {
    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner.read_exact(&mut buffer).map_err(|_| {
            KitError::BadIndex(format!(
                "unexpected end of file after {} bytes",
                self.consumed
            ))
        })?;

        self.digest.update(&buffer);
        self.consumed += size;
        Ok(Bytes::from(buffer))
    }

    /// Read the stored checksum (not hashed) and compare it with the running digest
    ///
    /// An all-zero checksum is what git writes with `index.skipHash` and is accepted as is.
    pub fn verify(&mut self) -> anyhow::Result<[u8; CHECKSUM_SIZE]> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected)
            .map_err(|_| KitError::BadIndex("missing trailing checksum".into()))?;

        if expected != [0; CHECKSUM_SIZE] && expected != self.digest() {
            return Err(
                KitError::BadIndex("checksum does not match value stored on disk".into()).into(),
            );
        }

        Ok(expected)
    }
}

impl<W: Write> Checksum<W> {
    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        self.consumed += data.len();
        Ok(())
    }
}
