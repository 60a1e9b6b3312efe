use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use anyhow::{Context, bail};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeEntry {
    File { mode: EntryMode, oid: ObjectId },
    Directory(TreeNode),
}

/// One directory level of the staged snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    children: BTreeMap<String, NodeEntry>,
}

impl TreeNode {
    /// Fold index entries into a trie rooted at the worktree
    pub fn from_index<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            if entry.stage() != 0 {
                bail!("cannot build a tree from unmerged entry {}", entry.name);
            }
            let mode = entry
                .mode()
                .with_context(|| format!("Invalid mode for index entry {}", entry.name))?;
            let segments: Vec<&str> = entry.name.split('/').collect();

            root.insert(&segments, mode, entry.oid.clone())
                .with_context(|| format!("Unable to place {} in the tree", entry.name))?;
        }

        Ok(root)
    }

    fn insert(&mut self, segments: &[&str], mode: EntryMode, oid: ObjectId) -> anyhow::Result<()> {
        match segments {
            [] => bail!("empty path"),
            [name] => {
                if let Some(NodeEntry::Directory(_)) = self.children.get(*name) {
                    bail!("{name} is both a file and a directory");
                }
                self.children
                    .insert(name.to_string(), NodeEntry::File { mode, oid });
                Ok(())
            }
            [dir, rest @ ..] => {
                let child = self
                    .children
                    .entry(dir.to_string())
                    .or_insert_with(|| NodeEntry::Directory(TreeNode::default()));

                match child {
                    NodeEntry::Directory(node) => node.insert(rest, mode, oid),
                    NodeEntry::File { .. } => bail!("{dir} is both a file and a directory"),
                }
            }
        }
    }

    /// Children in git's canonical order: byte-wise, directories compared as `name/`
    fn canonical_children(&self) -> Vec<(&String, &NodeEntry)> {
        let mut children: Vec<_> = self.children.iter().collect();
        children.sort_by_cached_key(|(name, entry)| {
            let mut key = name.as_bytes().to_vec();
            if let NodeEntry::Directory(_) = entry {
                key.push(b'/');
            }
            key
        });
        children
    }

    /// This node's tree and every tree below it, depth-first
    fn build(&self) -> anyhow::Result<(Tree, Vec<Tree>)> {
        let mut tree = Tree::default();
        let mut subtrees = Vec::new();

        for (name, child) in self.canonical_children() {
            match child {
                NodeEntry::File { mode, oid } => {
                    tree.add_entry(TreeEntry::new(*mode, name.clone(), oid.clone()));
                }
                NodeEntry::Directory(node) => {
                    let (subtree, descendants) = node.build()?;
                    tree.add_entry(TreeEntry::new(
                        EntryMode::Directory,
                        name.clone(),
                        subtree.object_id()?,
                    ));
                    subtrees.push(subtree);
                    subtrees.extend(descendants);
                }
            }
        }

        Ok((tree, subtrees))
    }

    pub fn to_tree(&self) -> anyhow::Result<Tree> {
        Ok(self.build()?.0)
    }

    /// Every tree of the snapshot, root first
    pub fn all_trees(&self) -> anyhow::Result<Vec<Tree>> {
        let (root, mut subtrees) = self.build()?;
        subtrees.insert(0, root);
        Ok(subtrees)
    }
}
