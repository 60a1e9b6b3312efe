use crate::areas::refs::HEADS_PREFIX;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::refs::ref_name::is_valid_ref_name;
use crate::errors::KitError;
use colored::Colorize;
use std::io::Write;

/// Commits shown by `log` when no distance is given
pub const DEFAULT_LOG_DISTANCE: usize = 5;

/// Where the history walk starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogStart {
    #[default]
    Head,
    Branch(String),
    Commit(String),
}

impl Repository {
    /// Print at most `distance` commits, following first parents from `start`
    pub fn log(&self, start: &LogStart, distance: usize) -> anyhow::Result<()> {
        let mut current = match start {
            LogStart::Head => Some(self.refs().read_head()?.ok_or_else(|| {
                anyhow::anyhow!("your current branch does not have any commits yet")
            })?),
            LogStart::Branch(branch) => {
                if !is_valid_ref_name(branch)? {
                    return Err(KitError::InvalidRefName(branch.clone()).into());
                }
                Some(self.refs().resolve(&format!("{HEADS_PREFIX}{branch}"))?)
            }
            LogStart::Commit(hash) => Some(self.find_object(hash)?),
        };

        let mut shown = 0;
        while let Some(commit_oid) = current.take() {
            if shown == distance {
                break;
            }

            let commit = self.load_commit(&commit_oid)?;
            if shown > 0 {
                writeln!(self.writer())?;
            }
            self.show_commit(&commit_oid, &commit)?;

            current = commit.parent().cloned();
            shown += 1;
        }

        Ok(())
    }

    fn load_commit(&self, commit_oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database()
            .load(commit_oid)?
            .into_commit()
            .ok_or_else(|| KitError::BadObject(format!("{commit_oid} is not a commit")).into())
    }

    fn show_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("commit {commit_oid}").yellow()
        )?;
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            commit.author().readable_timestamp()
        )?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {}", message_line)?;
        }

        Ok(())
    }
}
