use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::identity::Identity;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::tree_builder::TreeNode;
use crate::errors::KitError;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// `user.name` and `user.email` from the merged configuration, stamped with the current time
    pub fn identity(&self) -> anyhow::Result<Identity> {
        let name = self
            .config()
            .get("user", "name")
            .ok_or(KitError::MissingIdentity("name"))?;
        let email = self
            .config()
            .get("user", "email")
            .ok_or(KitError::MissingIdentity("email"))?;

        Ok(Identity::now(name, email))
    }

    /// Snapshot the index as a new commit on top of HEAD
    ///
    /// Trees are stored before the identity is checked, so a failed commit can leave
    /// unreferenced trees behind.
    pub fn commit(&self, message: &str) -> anyhow::Result<ObjectId> {
        let index = self.load_index()?;
        if index.is_empty() {
            return Err(KitError::EmptyIndex.into());
        }

        let trees = TreeNode::from_index(index.entries())?.all_trees()?;
        let tree_ids = trees
            .iter()
            .map(|tree| self.database().save(tree))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let tree_oid = tree_ids
            .first()
            .cloned()
            .context("Index did not produce a root tree")?;

        let parent = self.refs().read_head()?;
        let author = self.identity()?;
        let committer = author.clone();

        let is_root = parent.is_none();
        let commit = Commit::new(
            tree_oid,
            parent,
            author,
            committer,
            message.trim_end_matches('\n').to_string(),
        );
        let commit_oid = self.database().save(&commit)?;
        self.refs().update_head(&commit_oid)?;

        let branch = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        tracing::info!(oid = %commit_oid, branch = %branch, trees = trees.len(), "created commit");

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            if is_root { " (root-commit)" } else { "" },
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }
}
