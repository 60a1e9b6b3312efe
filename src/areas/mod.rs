//! Repository areas
//!
//! - `config`: Layered configuration (system, global, local)
//! - `database`: Object database for blobs, trees, commits and tags
//! - `index`: Staging area tracking the next commit's content
//! - `refs`: Reference management (HEAD, branches, tags)
//! - `repository`: Bootstrap, discovery and name resolution

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
