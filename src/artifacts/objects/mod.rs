//! Git object types and operations
//!
//! Every piece of repository content is an immutable object identified by the SHA-1 of its
//! header and body. There are four kinds:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Directory listing (modes, names and object IDs)
//! - **Commit**: Snapshot with metadata (tree, parent, author, committer, message)
//! - **Tag**: Annotated, named pointer to another object
//!
//! The stored form of an object is the zlib-compressed `<type> <size>\0<body>`, see [`codec`].

pub mod blob;
pub mod codec;
pub mod commit;
pub mod entry_mode;
pub mod identity;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
/// Length of a SHA-1 hash in binary format
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
