//! File metadata snapshot stored in index entries
//!
//! Unix platforms expose every field; elsewhere the unavailable fields are zero and regular
//! files are recorded as `0o100644`.

use derive_new::new;
use std::fs::Metadata;

/// Seconds and nanoseconds as stored in the index (truncated to 32 bits)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct EntryTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub ctime: EntryTime,
    pub mtime: EntryTime,
    pub dev: u32,
    pub ino: u32,
    /// Raw mode bits, file type included
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

#[cfg(unix)]
impl From<&Metadata> for FileStat {
    fn from(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        FileStat {
            ctime: EntryTime::new(metadata.ctime() as u32, metadata.ctime_nsec() as u32),
            mtime: EntryTime::new(metadata.mtime() as u32, metadata.mtime_nsec() as u32),
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        }
    }
}

#[cfg(not(unix))]
impl From<&Metadata> for FileStat {
    fn from(metadata: &Metadata) -> Self {
        let mode = if metadata.is_dir() {
            0o040000
        } else if metadata.is_symlink() {
            0o120000
        } else {
            0o100644
        };

        FileStat {
            mode,
            size: metadata.len() as u32,
            ..Default::default()
        }
    }
}
