use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{GitObject, Object, Packable};
use std::io::Write;

/// What `cat-file` prints about the object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatFileMode {
    #[default]
    Pretty,
    Type,
    Size,
}

impl Repository {
    pub fn cat_file(&self, object: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = self.find_object(object)?;
        let object = self.database().load(&object_id)?;

        match mode {
            CatFileMode::Type => writeln!(self.writer(), "{}", object.object_type())?,
            CatFileMode::Size => writeln!(self.writer(), "{}", object.byte_size()?)?,
            CatFileMode::Pretty => match &object {
                GitObject::Tree(tree) => writeln!(self.writer(), "{}", tree.display())?,
                // blobs, commits and tags are printed byte for byte
                _ => self.writer().write_all(&object.serialize()?)?,
            },
        }

        Ok(())
    }
}
