//! Staging area
//!
//! The index holds one entry per staged path, kept sorted by name and merge stage. It is
//! loaded from and written to an explicit path; a missing or empty file is an empty index.

use crate::artifacts::index::file_stat::FileStat;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_file::IndexFile;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::errors::KitError;
use anyhow::{Context, bail};
use std::path::{Component, Path};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    file: IndexFile,
}

/// Worktree-relative path in index form: UTF-8 with `/` separators
fn entry_name(file_name: &Path) -> anyhow::Result<String> {
    let mut segments = Vec::new();
    for component in file_name.components() {
        match component {
            Component::Normal(segment) => segments.push(
                segment
                    .to_str()
                    .with_context(|| format!("Path {} is not valid UTF-8", file_name.display()))?,
            ),
            Component::CurDir => {}
            _ => bail!("Path {} is outside the worktree", file_name.display()),
        }
    }

    if segments.is_empty() {
        bail!("Empty path cannot be staged");
    }
    Ok(segments.join("/"))
}

impl Index {
    pub fn new(file: IndexFile) -> Self {
        Index { file }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read(path)
            .with_context(|| format!("Unable to read index file {}", path.display()))?;
        if data.is_empty() {
            return Ok(Self::default());
        }

        let file = IndexFile::parse(&data)?;
        tracing::debug!(path = %path.display(), entries = file.entries.len(), "loaded index");

        Ok(Index { file })
    }

    /// Recompute the trailing checksum and write the index to `path`
    pub fn write(&mut self, path: &Path) -> anyhow::Result<()> {
        self.file.recompute_checksum();
        let data = self.file.serialize()?;

        std::fs::write(path, &data)
            .with_context(|| format!("Unable to write index file {}", path.display()))?;
        tracing::debug!(path = %path.display(), entries = self.file.entries.len(), "wrote index");

        Ok(())
    }

    pub fn file(&self) -> &IndexFile {
        &self.file
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.file.entries
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    pub fn recompute_checksum(&mut self) {
        self.file.recompute_checksum();
    }

    /// Whether an entry with this exact name exists, with the position of the first one
    ///
    /// When there is none, the position is where such an entry would be inserted.
    pub fn entry_exists(&self, name: &str) -> (bool, usize) {
        let position = self
            .file
            .entries
            .partition_point(|entry| entry.name.as_bytes() < name.as_bytes());

        let found = self
            .file
            .entries
            .get(position)
            .is_some_and(|entry| entry.name == name);
        (found, position)
    }

    pub fn add_entry(&mut self, entry: IndexEntry) {
        self.file.entries.push(entry);
        self.file.sort();
        self.file.recompute_checksum();
    }

    /// Replace the entry with the same name, or add it
    pub fn update_entry(&mut self, entry: IndexEntry) {
        match self.entry_exists(&entry.name) {
            (true, position) => {
                self.file.entries[position] = entry;
                self.file.sort();
                self.file.recompute_checksum();
            }
            (false, _) => self.add_entry(entry),
        }
    }

    /// Remove the entry at `position`; the checksum is left for the next write to refresh
    pub fn delete_entry(&mut self, position: usize) -> anyhow::Result<IndexEntry> {
        let len = self.file.entries.len();
        if position >= len {
            return Err(KitError::InvalidPosition { position, len }.into());
        }

        Ok(self.file.entries.remove(position))
    }

    /// Remove every entry staged under `name`
    pub fn remove(&mut self, name: &str) -> anyhow::Result<()> {
        let (found, position) = self.entry_exists(name);
        if !found {
            bail!("pathspec '{name}' did not match any files");
        }

        while self.file.entries.get(position).is_some_and(|entry| entry.name == name) {
            self.delete_entry(position)?;
        }

        Ok(())
    }

    /// Stage `root_dir/file_name` and return its blob
    ///
    /// The blob is not stored; callers that keep the entry must save it themselves.
    pub fn add_file(&mut self, root_dir: &Path, file_name: &Path) -> anyhow::Result<Blob> {
        let name = entry_name(file_name)?;
        IndexEntry::check_name_length(&name)?;
        let path = root_dir.join(file_name);

        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Unable to stat {}", path.display()))?;
        let blob = if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&path)
                .with_context(|| format!("Unable to read link {}", path.display()))?;
            Blob::new(target.to_string_lossy().into_owned())
        } else {
            Blob::from_file(&path).with_context(|| format!("Unable to read {}", path.display()))?
        };

        let entry = IndexEntry::new(name, blob.object_id()?, FileStat::from(&metadata));
        tracing::debug!(name = %entry.name, oid = %entry.oid, "staged file");
        self.update_entry(entry);

        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::file_stat::EntryTime;
    use crate::artifacts::objects::object_id::ObjectId;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn entry(name: &str) -> IndexEntry {
        let stat = FileStat {
            mtime: EntryTime::new(1700000000, 0),
            mode: 0o100644,
            ..Default::default()
        };
        let oid = ObjectId::try_parse("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391".to_string()).unwrap();
        IndexEntry::new(name.to_string(), oid, stat)
    }

    fn names(index: &Index) -> Vec<&str> {
        index.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[fixture]
    fn index() -> Index {
        let mut index = Index::default();
        for name in ["b.txt", "a/c.txt", "a.txt"] {
            index.add_entry(entry(name));
        }
        index
    }

    #[rstest]
    fn added_entries_are_kept_sorted(index: Index) {
        // '.' sorts before '/'
        assert_eq!(names(&index), vec!["a.txt", "a/c.txt", "b.txt"]);
    }

    #[rstest]
    fn lookup_reports_position(index: Index) {
        assert_eq!(index.entry_exists("a/c.txt"), (true, 1));
        assert_eq!(index.entry_exists("a/b.txt"), (false, 1));
        assert_eq!(index.entry_exists("z"), (false, 3));
    }

    #[rstest]
    fn update_replaces_entry_with_same_name(mut index: Index) {
        let mut replacement = entry("b.txt");
        replacement.stat.size = 42;

        index.update_entry(replacement.clone());
        index.update_entry(replacement);

        assert_eq!(index.entries().len(), 3);
        assert_eq!(index.entries()[2].stat.size, 42);
    }

    #[rstest]
    fn add_refreshes_checksum(mut index: Index) {
        let before = index.file().checksum;
        index.add_entry(entry("c.txt"));

        assert_ne!(index.file().checksum, before);
        let bytes = index.file().serialize().unwrap();
        assert!(IndexFile::parse(&bytes).is_ok());
    }

    #[rstest]
    #[case(3)]
    #[case(100)]
    fn out_of_range_deletes_fail(mut index: Index, #[case] position: usize) {
        let err = index.delete_entry(position).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KitError>(),
            Some(KitError::InvalidPosition { len: 3, .. })
        ));
    }

    #[rstest]
    fn delete_leaves_checksum_stale(mut index: Index) {
        let before = index.file().checksum;
        let removed = index.delete_entry(0).unwrap();

        assert_eq!(removed.name, "a.txt");
        assert_eq!(index.file().checksum, before);
    }

    #[rstest]
    fn remove_by_name(mut index: Index) {
        index.remove("a/c.txt").unwrap();

        assert_eq!(names(&index), vec!["a.txt", "b.txt"]);
        assert!(index.remove("a/c.txt").is_err());
    }

    #[test]
    fn missing_and_empty_files_load_as_empty_index() {
        let dir = assert_fs::TempDir::new().unwrap();
        let empty = dir.child("index");
        empty.touch().unwrap();

        assert!(Index::load(&dir.path().join("missing")).unwrap().is_empty());
        assert!(Index::load(empty.path()).unwrap().is_empty());
    }

    #[rstest]
    fn written_index_loads_back(mut index: Index) {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("index");

        index.write(&path).unwrap();

        assert_eq!(Index::load(&path).unwrap(), index);
    }

    #[test]
    fn add_file_hashes_content_as_a_blob() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("docs/hello.txt").write_str("hello world").unwrap();

        let mut index = Index::default();
        let blob = index.add_file(dir.path(), Path::new("docs/hello.txt")).unwrap();

        assert_eq!(blob.content(), b"hello world");
        let staged = &index.entries()[0];
        assert_eq!(staged.name, "docs/hello.txt");
        assert_eq!(staged.oid.as_ref(), "95d09f2b10159347eece71399a7e2e907ea3df4f");
        assert_eq!(staged.stat.size, 11);
        assert_eq!(staged.flags.name_length(), 14);
    }

    #[test]
    fn add_file_outside_the_worktree_is_refused() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut index = Index::default();

        assert!(index.add_file(dir.path(), Path::new("../escape")).is_err());
    }

    #[test]
    fn add_file_refuses_names_too_long_for_the_index() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut index = Index::default();
        let name = format!("{}file.txt", "nested/".repeat(600));

        let err = index.add_file(dir.path(), Path::new(&name)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KitError>(),
            Some(KitError::NameTooLong(_))
        ));
        assert!(index.is_empty());
    }

    proptest! {
        #[test]
        fn entries_stay_sorted_and_unique(names in proptest::collection::vec("[a-c]{1,3}(/[a-c]{1,2})?", 1..24)) {
            let mut index = Index::default();
            for name in &names {
                index.update_entry(entry(name));
            }

            let stored: Vec<&str> = index.entries().iter().map(|e| e.name.as_str()).collect();
            let mut expected: Vec<&str> = names.iter().map(String::as_str).collect();
            expected.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
            expected.dedup();

            prop_assert_eq!(stored, expected);
        }
    }
}
