//! Git commit object
//!
//! Commits record a snapshot of the repository at a point in time. They contain:
//! - A tree object ID (directory snapshot)
//! - At most one parent commit ID (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::identity::Identity;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::KitError;
use bytes::Bytes;
use std::io::BufRead;

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree_oid: ObjectId,
    /// None for a root commit
    parent: Option<ObjectId>,
    author: Identity,
    committer: Identity,
    message: String,
}

impl Commit {
    pub fn new(
        tree_oid: ObjectId,
        parent: Option<ObjectId>,
        author: Identity,
        committer: Identity,
        message: String,
    ) -> Self {
        Commit {
            tree_oid,
            parent,
            author,
            committer,
            message,
        }
    }

    /// First line of the commit message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Identity {
        &self.author
    }

    pub fn committer(&self) -> &Identity {
        &self.committer
    }

    fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content = format!("{}\n\n{}\n", self.header_lines().join("\n"), self.message);
        Ok(Bytes::from(content))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let bad = |reason: &str| KitError::BadObject(format!("invalid commit object: {reason}"));

        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content).map_err(|_| bad("not UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| bad("missing blank line before message"))?;
        let message = message.strip_suffix('\n').unwrap_or(message).to_string();

        let mut tree_oid = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            let (key, value) = line.split_once(' ').unwrap_or((line, ""));
            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" if parent.is_some() => return Err(bad("more than one parent").into()),
                "parent" => parent = Some(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(Identity::try_from(value)?),
                "committer" => committer = Some(Identity::try_from(value)?),
                // continuation lines and headers such as encoding or gpgsig carry nothing we keep
                _ => {}
            }
        }

        Ok(Commit {
            tree_oid: tree_oid.ok_or_else(|| bad("missing tree line"))?,
            parent,
            author: author.ok_or_else(|| bad("missing author line"))?,
            committer: committer.ok_or_else(|| bad("missing committer line"))?,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        format!("{}\n\n{}", self.header_lines().join("\n"), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex.to_string()).unwrap()
    }

    #[fixture]
    fn author() -> Identity {
        Identity::try_from("Simon Taye <mulat.simon@gmail.com> 1625088346 +0300").unwrap()
    }

    #[fixture]
    fn committer() -> Identity {
        Identity::try_from("Release Bot <bot@example.com> 1625090000 +0000").unwrap()
    }

    #[rstest]
    fn commit_body_has_canonical_line_order(author: Identity, committer: Identity) {
        let commit = Commit::new(
            oid("1335d19337aa47bb0b0ff5e8444a65cd8d63584c"),
            Some(oid("95d09f2b10159347eece71399a7e2e907ea3df4f")),
            author,
            committer,
            "Add ini parser".to_string(),
        );

        let body = commit.serialize().unwrap();
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "tree 1335d19337aa47bb0b0ff5e8444a65cd8d63584c\n\
             parent 95d09f2b10159347eece71399a7e2e907ea3df4f\n\
             author Simon Taye <mulat.simon@gmail.com> 1625088346 +0300\n\
             committer Release Bot <bot@example.com> 1625090000 +0000\n\
             \n\
             Add ini parser\n"
        );
    }

    #[rstest]
    fn root_commit_round_trips(author: Identity, committer: Identity) {
        let commit = Commit::new(
            oid("1335d19337aa47bb0b0ff5e8444a65cd8d63584c"),
            None,
            author,
            committer,
            "first\n\nwith a body".to_string(),
        );

        let decoded = Commit::deserialize(commit.serialize().unwrap().as_ref()).unwrap();

        assert_eq!(decoded, commit);
        assert_eq!(decoded.parent(), None);
        assert_eq!(decoded.short_message(), "first");
        assert_eq!(decoded.object_id().unwrap(), commit.object_id().unwrap());
    }

    #[rstest]
    #[case("parent 95d09f2b10159347eece71399a7e2e907ea3df4f\nauthor a <a> 1 +0000\ncommitter a <a> 1 +0000\n\nmsg\n")]
    #[case("tree 1335d19337aa47bb0b0ff5e8444a65cd8d63584c\nauthor broken\ncommitter a <a> 1 +0000\n\nmsg\n")]
    #[case("tree 1335d19337aa47bb0b0ff5e8444a65cd8d63584c\nauthor a <a> 1 +0000\ncommitter a <a> 1 +0000\n")]
    #[case("tree 1335d19337aa47bb0b0ff5e8444a65cd8d63584c\n\
            parent 95d09f2b10159347eece71399a7e2e907ea3df4f\n\
            parent e69de29bb2d1d6434b8b29ae775ad8c2e48c5391\n\
            author a <a> 1 +0000\ncommitter a <a> 1 +0000\n\nmerge\n")]
    fn malformed_commits_are_bad_objects(#[case] body: &str) {
        let err = Commit::deserialize(body.as_bytes()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KitError>(),
            Some(KitError::BadObject(_))
        ));
    }
}
