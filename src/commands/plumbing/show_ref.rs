use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print `<hash> <ref path>` for every resolvable ref, sorted by path
    pub fn show_ref(&self) -> anyhow::Result<()> {
        for (name, oid) in self.refs().enumerate_all_refs()? {
            writeln!(self.writer(), "{oid} {name}")?;
        }

        Ok(())
    }
}
