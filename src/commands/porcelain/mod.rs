//! Porcelain commands
//!
//! - `init`: Create an empty repository
//! - `add` / `rm`: Stage and unstage paths
//! - `commit`: Snapshot the index
//! - `log`: Walk first-parent history
//! - `tag`: List, create and delete tags

pub mod add;
pub mod commit;
pub mod init;
pub mod log;
pub mod rm;
pub mod tag;
