use crate::areas::repository::{GIT_DIR_NAME, Repository};
use anyhow::Context;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

impl Repository {
    /// Stage files and directories given relative to `cwd`
    pub fn add(&self, cwd: &Path, paths: &[String]) -> anyhow::Result<()> {
        let worktree = self
            .worktree()
            .canonicalize()
            .with_context(|| format!("Unable to resolve worktree {}", self.worktree().display()))?;
        let mut index = self.load_index()?;

        for path in paths {
            for file_name in Self::expand_path(&worktree, &cwd.join(path))? {
                let blob = index.add_file(&worktree, &file_name)?;
                self.database().save(&blob)?;
            }
        }

        index.write(&self.index_path())?;

        Ok(())
    }

    /// Files under `path`, relative to the worktree, skipping the git directory
    fn expand_path(worktree: &Path, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let path = path
            .canonicalize()
            .with_context(|| format!("pathspec '{}' did not match any files", path.display()))?;

        let files = WalkDir::new(&path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != GIT_DIR_NAME)
            .filter_map(|entry| entry.ok())
            .filter(|entry| !entry.file_type().is_dir())
            .map(|entry| {
                entry
                    .path()
                    .strip_prefix(worktree)
                    .map(Path::to_path_buf)
                    .with_context(|| {
                        format!("{} is outside the worktree", entry.path().display())
                    })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        tracing::debug!(path = %path.display(), files = files.len(), "expanded pathspec");
        Ok(files)
    }
}
