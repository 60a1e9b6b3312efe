use crate::areas::database::Database;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::{Read, Write};
use std::path::Path;

/// Where `hash-object` reads the content from
#[derive(Debug, Clone)]
pub enum HashSource<'p> {
    Stdin,
    File(&'p Path),
}

impl HashSource<'_> {
    pub fn read_blob(&self) -> anyhow::Result<Blob> {
        match self {
            HashSource::Stdin => {
                let mut content = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut content)
                    .context("Unable to read standard input")?;
                Ok(Blob::new(content))
            }
            HashSource::File(path) => Blob::from_file(path)
                .with_context(|| format!("Unable to read {}", path.display())),
        }
    }
}

/// Print the blob's ID, storing it first when a database is given
///
/// Hashing alone does not need a repository, so this is not tied to one.
pub fn hash_object(
    blob: &Blob,
    database: Option<&Database>,
    writer: &mut dyn Write,
) -> anyhow::Result<ObjectId> {
    let object_id = match database {
        Some(database) => database.save(blob)?,
        None => blob.object_id()?,
    };

    writeln!(writer, "{object_id}")?;

    Ok(object_id)
}
