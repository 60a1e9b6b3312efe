//! In-memory image of an index file and its binary codec

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::extension::Extension;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, DEFAULT_VERSION, HEADER_SIZE, MIN_ENTRY_SIZE};
use crate::errors::KitError;
use byteorder::ByteOrder;
use bytes::Bytes;
use std::io::Cursor;

/// Size of an extension's signature and length fields
const EXTENSION_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
    pub extensions: Vec<Extension>,
    /// SHA-1 of everything before it, as last parsed or recomputed
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl Default for IndexFile {
    fn default() -> Self {
        IndexFile::empty(DEFAULT_VERSION)
    }
}

impl IndexFile {
    pub fn empty(version: u32) -> Self {
        let mut index = IndexFile {
            version,
            entries: Vec::new(),
            extensions: Vec::new(),
            checksum: [0; CHECKSUM_SIZE],
        };
        index.recompute_checksum();
        index
    }

    pub fn header(&self) -> IndexHeader {
        IndexHeader::new(self.version, self.entries.len() as u32)
    }

    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.cmp_position(b));
    }

    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        let mut reader = Checksum::new(Cursor::new(data));

        let header = IndexHeader::deserialize(&reader.read(HEADER_SIZE)?)?;

        let room = data.len().saturating_sub(HEADER_SIZE + CHECKSUM_SIZE);
        if (header.entries_count as usize).saturating_mul(MIN_ENTRY_SIZE) > room {
            return Err(KitError::BadIndex(format!(
                "{} entries cannot fit in {room} bytes",
                header.entries_count
            ))
            .into());
        }

        let mut entries = Vec::with_capacity(header.entries_count as usize);
        for _ in 0..header.entries_count {
            entries.push(IndexEntry::read_from(&mut reader, header.version)?);
        }

        let mut extensions = Vec::new();
        while data.len() - reader.consumed() > CHECKSUM_SIZE {
            let extension_header = reader.read(EXTENSION_HEADER_SIZE)?;
            let mut signature = [0u8; 4];
            signature.copy_from_slice(&extension_header[0..4]);
            let size = byteorder::NetworkEndian::read_u32(&extension_header[4..8]) as usize;

            if size > data.len().saturating_sub(reader.consumed() + CHECKSUM_SIZE) {
                return Err(KitError::BadIndex(format!(
                    "extension {} claims {size} bytes past the end of the file",
                    String::from_utf8_lossy(&signature)
                ))
                .into());
            }

            extensions.push(Extension::new(signature, reader.read(size)?));
        }

        if data.len() - reader.consumed() != CHECKSUM_SIZE {
            return Err(KitError::BadIndex(format!(
                "{} trailing bytes where a {CHECKSUM_SIZE} byte checksum was expected",
                data.len() - reader.consumed()
            ))
            .into());
        }
        let checksum = reader.verify()?;

        let mut index = IndexFile {
            version: header.version,
            entries,
            extensions,
            checksum,
        };
        index.sort();

        Ok(index)
    }

    /// Header, entries and extensions, with the SHA-1 of those bytes
    fn serialize_content(&self) -> anyhow::Result<(Vec<u8>, [u8; CHECKSUM_SIZE])> {
        let mut writer = Checksum::new(Vec::new());

        writer.write(&self.header().serialize()?)?;
        for entry in &self.entries {
            writer.write(&entry.serialize()?)?;
        }
        for extension in &self.extensions {
            writer.write(&extension.serialize()?)?;
        }

        let digest = writer.digest();
        Ok((writer.into_inner(), digest))
    }

    /// Serialize with the stored trailing checksum
    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let (mut content, _) = self.serialize_content()?;
        content.extend_from_slice(&self.checksum);

        Ok(Bytes::from(content))
    }

    pub fn recompute_checksum(&mut self) {
        // serializing to memory only fails on entries whose fields overflow the format
        if let Ok((_, digest)) = self.serialize_content() {
            self.checksum = digest;
        }
    }
}
