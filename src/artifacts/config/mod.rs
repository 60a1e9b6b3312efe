//! Git-style INI configuration files
//!
//! - `ini_file`: parsing, lookup and writing of a single file

pub mod ini_file;
