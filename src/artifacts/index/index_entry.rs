//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//! - Flags (assume-valid, extended, merge stage, name length)
//!
//! ## Entry Format
//!
//! ```text
//! ctime sec, ctime nsec, mtime sec, mtime nsec   4 x u32
//! dev, ino, mode, uid, gid, size                 6 x u32
//! object id                                      20 bytes
//! flags                                          u16
//! extended flags (version 3, extended bit only)  u16
//! path, NUL, zero padding to a multiple of 8
//! ```

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::file_stat::{EntryTime, FileStat};
use crate::artifacts::index::{ENTRY_BLOCK, ENTRY_METADATA_SIZE, MAX_NAME_LENGTH};
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::KitError;
use bitflags::bitflags;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use std::cmp::{Ordering, min};
use std::io::Read;

bitflags! {
    /// The 16-bit flags field of an index entry
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;
        const STAGE = 0x3000;
        const NAME_LENGTH = 0x0FFF;
    }
}

const STAGE_SHIFT: u16 = 12;

impl EntryFlags {
    pub fn stage(&self) -> u8 {
        ((self.bits() & Self::STAGE.bits()) >> STAGE_SHIFT) as u8
    }

    pub fn name_length(&self) -> usize {
        (self.bits() & Self::NAME_LENGTH.bits()) as usize
    }

    /// Flags for a stage 0 entry with the given name length, clamped to the field width
    pub fn for_name(name_length: usize) -> Self {
        Self::from_bits_retain(min(name_length, MAX_NAME_LENGTH) as u16)
    }
}

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// File path relative to the worktree, with `/` separators
    pub name: String,
    /// Hash of the staged blob
    pub oid: ObjectId,
    pub stat: FileStat,
    pub flags: EntryFlags,
    /// Present only in version 3 indexes for entries with the extended bit
    pub extended_flags: Option<u16>,
}

impl IndexEntry {
    pub fn new(name: String, oid: ObjectId, stat: FileStat) -> Self {
        let flags = EntryFlags::for_name(name.len());

        IndexEntry {
            name,
            oid,
            stat,
            flags,
            extended_flags: None,
        }
    }

    pub fn stage(&self) -> u8 {
        self.flags.stage()
    }

    pub fn set_stage(&mut self, stage: u8) {
        let stage_bits = ((stage as u16) << STAGE_SHIFT) & EntryFlags::STAGE.bits();
        self.flags = EntryFlags::from_bits_retain((self.flags.bits() & !EntryFlags::STAGE.bits()) | stage_bits);
    }

    pub fn set_extended_flags(&mut self, extended_flags: Option<u16>) {
        self.flags.set(EntryFlags::EXTENDED, extended_flags.is_some());
        self.extended_flags = extended_flags;
    }

    /// Tree entry mode derived from the raw mode bits
    pub fn mode(&self) -> anyhow::Result<EntryMode> {
        EntryMode::from_stat_mode(self.stat.mode)
    }

    /// Ordering of entries in the index: name byte-wise, then stage
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.name
            .as_bytes()
            .cmp(other.name.as_bytes())
            .then(self.stage().cmp(&other.stage()))
    }

    /// Names this long do not fit the flags and are refused rather than stored
    pub fn check_name_length(name: &str) -> anyhow::Result<()> {
        if name.len() >= MAX_NAME_LENGTH {
            return Err(KitError::NameTooLong(name.to_string()).into());
        }

        Ok(())
    }

    /// On-disk length, padding included
    fn encoded_length(&self, name_length: usize) -> usize {
        let extended = if self.extended_flags.is_some() { 2 } else { 0 };
        let unpadded = ENTRY_METADATA_SIZE + extended + name_length + 1;
        unpadded.div_ceil(ENTRY_BLOCK) * ENTRY_BLOCK
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        Self::check_name_length(&self.name)?;

        let mut entry_bytes = Vec::with_capacity(self.encoded_length(self.name.len()));
        let stat = &self.stat;

        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.ctime.seconds)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.ctime.nanoseconds)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.mtime.seconds)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.mtime.nanoseconds)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.dev)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.ino)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.mode)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(stat.size)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.flags.bits())?;
        if let Some(extended_flags) = self.extended_flags {
            entry_bytes.write_u16::<byteorder::NetworkEndian>(extended_flags)?;
        }
        entry_bytes.extend_from_slice(self.name.as_bytes());

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    /// Read one entry, padding included
    pub fn read_from<R: Read>(reader: &mut Checksum<R>, version: u32) -> anyhow::Result<Self> {
        let bytes = reader.read(ENTRY_METADATA_SIZE)?;

        let stat = FileStat {
            ctime: EntryTime::new(
                byteorder::NetworkEndian::read_u32(&bytes[0..4]),
                byteorder::NetworkEndian::read_u32(&bytes[4..8]),
            ),
            mtime: EntryTime::new(
                byteorder::NetworkEndian::read_u32(&bytes[8..12]),
                byteorder::NetworkEndian::read_u32(&bytes[12..16]),
            ),
            dev: byteorder::NetworkEndian::read_u32(&bytes[16..20]),
            ino: byteorder::NetworkEndian::read_u32(&bytes[20..24]),
            mode: byteorder::NetworkEndian::read_u32(&bytes[24..28]),
            uid: byteorder::NetworkEndian::read_u32(&bytes[28..32]),
            gid: byteorder::NetworkEndian::read_u32(&bytes[32..36]),
            size: byteorder::NetworkEndian::read_u32(&bytes[36..40]),
        };
        let oid = ObjectId::read_h40_from(&mut &bytes[40..60])?;
        let flags = EntryFlags::from_bits_retain(byteorder::NetworkEndian::read_u16(&bytes[60..62]));

        let extended_flags = if flags.contains(EntryFlags::EXTENDED) {
            if version < 3 {
                return Err(KitError::BadIndex(format!(
                    "extended flag set on an entry of a version {version} index"
                ))
                .into());
            }
            Some(byteorder::NetworkEndian::read_u16(&reader.read(2)?))
        } else {
            None
        };

        let name_length = flags.name_length();
        if name_length == MAX_NAME_LENGTH {
            return Err(KitError::BadIndex(format!(
                "entry names of {MAX_NAME_LENGTH} bytes or more are not supported"
            ))
            .into());
        }

        let name_bytes = reader.read(name_length + 1)?;
        if name_bytes[name_length] != 0 {
            return Err(KitError::BadIndex("entry name is not NUL terminated".into()).into());
        }
        let name = std::str::from_utf8(&name_bytes[..name_length])
            .map_err(|_| KitError::BadIndex("entry name is not valid UTF-8".into()))?
            .to_string();

        let entry = IndexEntry {
            name,
            oid,
            stat,
            flags,
            extended_flags,
        };

        let read_so_far = ENTRY_METADATA_SIZE + entry.extended_flags.map_or(0, |_| 2) + name_length + 1;
        reader.read(entry.encoded_length(name_length) - read_so_far)?;

        Ok(entry)
    }
}
