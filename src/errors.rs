//! Repository error taxonomy
//!
//! Operations return `anyhow::Result` and attach I/O context along the way. The failures a
//! caller may want to react to are raised as a [`KitError`] inside the `anyhow::Error`, so they
//! can be recovered with `err.downcast_ref::<KitError>()`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum KitError {
    /// Malformed object header or body
    #[error("Could not read object: {0}")]
    BadObject(String),

    /// A hash, prefix or ref name did not resolve to an object
    #[error("{0} is not a valid object name")]
    ObjectNotFound(String),

    /// Signature, version, length or checksum mismatch while parsing the index
    ///
    /// An all-zero checksum trailer is never a mismatch.
    #[error("Error parsing index file: {0}")]
    BadIndex(String),

    /// Index entry names are limited to 4094 bytes
    #[error("Path is too long to be staged: {0}")]
    NameTooLong(String),

    #[error("The position {position} provided for deletion is invalid (index has {len} entries)")]
    InvalidPosition { position: usize, len: usize },

    #[error("Directory does not contain a repository: {}", .0.display())]
    NoRepository(PathBuf),

    #[error("Could not find repository in the directory or its parents: {}", .0.display())]
    NoRepositoryFound(PathBuf),

    #[error("Repository already exists in {}", .0.display())]
    RepositoryExists(PathBuf),

    /// A name that cannot be used as a ref path
    #[error("'{0}' is not a valid ref name")]
    InvalidRefName(String),

    #[error("refs/tags/{0} already exists")]
    TagAlreadyExists(String),

    #[error("index is empty, there is nothing to commit")]
    EmptyIndex,

    #[error("No {0} set; please set the user {0} in the configuration")]
    MissingIdentity(&'static str),

    /// Symbolic ref chain longer than the hop limit
    #[error("Too many levels of symbolic refs while resolving {0}")]
    RefCycle(String),
}
