use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// `init` as run from the command line: create the repository and report where
    pub fn initialize(dir: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        let repository = Self::init(dir, writer)?;

        writeln!(
            repository.writer(),
            "Initialized empty Git repository in {}",
            repository.git_dir().display()
        )?;

        Ok(repository)
    }
}
