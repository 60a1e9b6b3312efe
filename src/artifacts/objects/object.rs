use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Serialize the object body (never the header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Parse an object body (the header has already been consumed)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// ASCII decimal length of the serialized body
    fn byte_size(&self) -> Result<String> {
        Ok(self.serialize()?.len().to_string())
    }

    /// `<kind> <size>\0`
    fn header(&self) -> Result<Bytes> {
        let header = format!("{} {}\0", self.object_type().as_str(), self.byte_size()?);
        Ok(Bytes::from(header))
    }

    /// Header followed by body, as hashed and stored
    fn raw(&self) -> Result<Bytes> {
        let header = self.header()?;
        let body = self.serialize()?;

        let mut raw = Vec::with_capacity(header.len() + body.len());
        raw.extend_from_slice(&header);
        raw.extend_from_slice(&body);
        Ok(Bytes::from(raw))
    }

    fn object_id(&self) -> Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(self.raw()?);

        let oid: [u8; 20] = hasher.finalize().into();
        Ok(ObjectId::from_raw(&oid))
    }

    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Any of the four object kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl GitObject {
    fn inner(&self) -> &dyn Object {
        match self {
            GitObject::Blob(blob) => blob,
            GitObject::Tree(tree) => tree,
            GitObject::Commit(commit) => commit,
            GitObject::Tag(tag) => tag,
        }
    }

    pub fn into_commit(self) -> Option<Commit> {
        match self {
            GitObject::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            GitObject::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

impl Packable for GitObject {
    fn serialize(&self) -> Result<Bytes> {
        self.inner().serialize()
    }
}

impl Object for GitObject {
    fn object_type(&self) -> ObjectType {
        self.inner().object_type()
    }

    fn display(&self) -> String {
        self.inner().display()
    }
}

impl From<Blob> for GitObject {
    fn from(blob: Blob) -> Self {
        GitObject::Blob(blob)
    }
}

impl From<Tree> for GitObject {
    fn from(tree: Tree) -> Self {
        GitObject::Tree(tree)
    }
}

impl From<Commit> for GitObject {
    fn from(commit: Commit) -> Self {
        GitObject::Commit(commit)
    }
}

impl From<Tag> for GitObject {
    fn from(tag: Tag) -> Self {
        GitObject::Tag(tag)
    }
}
