use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::KitError;

/// Type bits of a raw `st_mode`
const TYPE_MASK: u32 = 0o170000;
const TYPE_REGULAR: u32 = 0o100000;
const TYPE_SYMLINK: u32 = 0o120000;
const TYPE_DIRECTORY: u32 = 0o040000;

const OWNER_EXECUTE: u32 = 0o100;
const WORLD_EXECUTE: u32 = 0o001;

/// File mode of a tree entry
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    #[default]
    Normal,
    Executable,
    Symlink,
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Normal => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "040000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Normal => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o040000,
        }
    }

    /// Kind of object an entry with this mode points at
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Directory => ObjectType::Tree,
            _ => ObjectType::Blob,
        }
    }

    /// Parse the octal mode text of a tree entry
    ///
    /// Accepts git's unpadded `40000` as well as `040000` for directories.
    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        match mode {
            "100644" => Ok(EntryMode::Normal),
            "100755" => Ok(EntryMode::Executable),
            "120000" => Ok(EntryMode::Symlink),
            "040000" | "40000" => Ok(EntryMode::Directory),
            _ => Err(KitError::BadObject(format!("invalid tree entry mode {mode}")).into()),
        }
    }

    /// Classify raw platform mode bits as stored in the index
    ///
    /// Regular files become executable when either the owner or the world execute bit is set.
    pub fn from_stat_mode(mode: u32) -> anyhow::Result<Self> {
        match mode & TYPE_MASK {
            TYPE_REGULAR if mode & (OWNER_EXECUTE | WORLD_EXECUTE) != 0 => Ok(EntryMode::Executable),
            TYPE_REGULAR => Ok(EntryMode::Normal),
            TYPE_SYMLINK => Ok(EntryMode::Symlink),
            TYPE_DIRECTORY => Ok(EntryMode::Directory),
            other => Err(anyhow::anyhow!("unsupported file type bits {other:o} in mode {mode:o}")),
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
