//! Conversion of the flat staging index into a graph of tree objects
//!
//! Index entries are slash-separated paths. They are folded into a trie of [`TreeNode`]s keyed
//! by path segment, which is then turned into one [`Tree`](crate::artifacts::objects::tree::Tree)
//! per directory.

pub mod tree_node;

pub use tree_node::TreeNode;
