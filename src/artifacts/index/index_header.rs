use crate::artifacts::index::{DEFAULT_VERSION, HEADER_SIZE, SIGNATURE, SUPPORTED_VERSIONS};
use crate::errors::KitError;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn empty() -> Self {
        IndexHeader {
            version: DEFAULT_VERSION,
            entries_count: 0,
        }
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(SIGNATURE);
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }

    /// Parse and validate the 12 header bytes
    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(KitError::BadIndex("truncated header".into()).into());
        }

        if &bytes[0..4] != SIGNATURE {
            return Err(KitError::BadIndex(format!(
                "invalid signature {:?}",
                String::from_utf8_lossy(&bytes[0..4])
            ))
            .into());
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(KitError::BadIndex(format!("unsupported version {version}")).into());
        }
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            version,
            entries_count,
        })
    }
}
