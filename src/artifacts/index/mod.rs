//! Git index file format
//!
//! The index (also called staging area or cache) records the files that will make up the next
//! commit, together with the file-system metadata observed when they were staged.
//!
//! ## File Format (versions 2 and 3)
//!
//! All integers are big-endian.
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 or 3 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - 62 bytes of metadata, object ID and flags
//!   - 2 bytes of extended flags (version 3, extended bit set)
//!   - NUL terminated path, zero padded to a multiple of 8 bytes
//!
//! Extensions (variable length):
//!   - Signature (4 bytes), size (4 bytes), data
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes, or all zeros when the writer skipped hashing
//! ```

pub mod checksum;
pub mod extension;
pub mod file_stat;
pub mod index_entry;
pub mod index_file;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// Version written for new indexes
pub const DEFAULT_VERSION: u32 = 2;

/// Versions this crate reads and writes
pub const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];

/// Fixed part of an entry, up to and including the 16-bit flags
pub const ENTRY_METADATA_SIZE: usize = 62;

/// Block size for entry alignment
pub const ENTRY_BLOCK: usize = 8;

/// Smallest encoded entry: the metadata block, a NUL and padding
pub const MIN_ENTRY_SIZE: usize = 64;

/// Name lengths at or above this value are not stored in the flags
pub const MAX_NAME_LENGTH: usize = 0x0FFF;
