//! Command implementations
//!
//! - `plumbing`: Low-level commands working directly on objects, refs and the index
//!   (cat-file, hash-object, ls-files, show-ref)
//! - `porcelain`: User-facing workflows (init, add, rm, commit, log, tag)
//!
//! Commands are `impl Repository` blocks and print through the repository's writer.

pub mod plumbing;
pub mod porcelain;
