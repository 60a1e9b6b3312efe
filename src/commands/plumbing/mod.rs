//! Plumbing commands
//!
//! - `cat-file`: Print an object's kind, size or content
//! - `hash-object`: Compute a blob's ID and optionally store it
//! - `ls-files`: List staged paths
//! - `show-ref`: List every ref with the object it resolves to

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
pub mod show_ref;
