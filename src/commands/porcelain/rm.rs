use crate::areas::repository::Repository;

impl Repository {
    /// Unstage index entries by name; the working tree is left alone
    pub fn rm(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.load_index()?;

        for path in paths {
            index.remove(path)?;
        }

        index.write(&self.index_path())?;

        Ok(())
    }
}
