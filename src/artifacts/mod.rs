//! Git data structures and their on-disk formats
//!
//! - `config`: INI-style configuration files
//! - `index`: Index file codec (header, entries, extensions, checksum)
//! - `objects`: Object types (blob, tree, commit, tag) and their codec
//! - `refs`: Ref name validation
//! - `tree_builder`: Nested tree construction from flat index entries

pub mod config;
pub mod index;
pub mod objects;
pub mod refs;
pub mod tree_builder;
