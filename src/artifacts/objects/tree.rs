//! Git tree object
//!
//! Trees represent directory snapshots. They list files (blobs) and subdirectories (other
//! trees) together with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are serialized in the order they were added; the tree builder is responsible for
//! handing them over in canonical order.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::KitError;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// One line of a tree: a named, moded pointer to a blob or a subtree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

/// Git tree object representing a directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Tree { entries }
    }

    pub fn add_entry(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut tree_bytes = Vec::new();

        for entry in &self.entries {
            write!(tree_bytes, "{} {}", entry.mode.as_str(), entry.name)?;
            tree_bytes.push(0);
            entry.oid.write_h40_to(&mut tree_bytes)?;
        }

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(KitError::BadObject("tree entry truncated in mode".into()).into());
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| KitError::BadObject("tree entry mode is not ASCII".into()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(KitError::BadObject("tree entry truncated in name".into()).into());
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| KitError::BadObject("tree entry name is not UTF-8".into()))?;

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| KitError::BadObject(format!("tree entry {name} truncated in hash")))?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    entry.mode.object_type().as_str(),
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
