//! Git references (HEAD, branches, tags)
//!
//! References are human-readable names for object IDs. A ref file holds either:
//! - A 40-character SHA-1 hash (direct reference)
//! - `ref: <path>` for symbolic references, the path being relative to the git directory
//!
//! Symbolic chains are followed for at most [`MAX_SYMREF_DEPTH`] hops.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::refs::ref_name::TagName;
use crate::errors::KitError;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

pub const HEADS_PREFIX: &str = "refs/heads/";
pub const TAGS_PREFIX: &str = "refs/tags/";

/// Longest chain of symbolic refs that is followed
pub const MAX_SYMREF_DEPTH: usize = 5;

/// Parsed content of a ref file
#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    /// None for a missing or empty ref file
    fn read(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {}", path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef(symref_match[1].trim().to_string())))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(content.to_string())?)))
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Follow `name` through symbolic refs to the last ref in the chain
    ///
    /// Returns that ref's name and its content, if any.
    fn follow(&self, name: &str) -> anyhow::Result<(String, Option<ObjectId>)> {
        let mut current = name.to_string();

        for _ in 0..=MAX_SYMREF_DEPTH {
            match SymRefOrOid::read(&self.ref_path(&current))? {
                Some(SymRefOrOid::SymRef(target)) => current = target,
                Some(SymRefOrOid::Oid(oid)) => return Ok((current, Some(oid))),
                None => return Ok((current, None)),
            }
        }

        Err(KitError::RefCycle(name.to_string()).into())
    }

    /// Object ID a ref ultimately points at
    pub fn resolve(&self, name: &str) -> anyhow::Result<ObjectId> {
        match self.follow(name)? {
            (_, Some(oid)) => Ok(oid),
            (_, None) => Err(KitError::ObjectNotFound(name.to_string()).into()),
        }
    }

    /// Resolve HEAD, or None while the current branch has no commits
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.follow(HEAD_REF_NAME)?.1)
    }

    pub fn is_detached(&self) -> anyhow::Result<bool> {
        Ok(!matches!(
            SymRefOrOid::read(&self.head_path())?,
            Some(SymRefOrOid::SymRef(_))
        ))
    }

    /// Short name of the branch HEAD points at, None when detached
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        if self.is_detached()? {
            return Ok(None);
        }

        let (target, _) = self.follow(HEAD_REF_NAME)?;
        Ok(Some(
            target
                .strip_prefix(HEADS_PREFIX)
                .unwrap_or(&target)
                .to_string(),
        ))
    }

    /// Point the ref at the end of HEAD's symbolic chain at `oid`
    ///
    /// When HEAD is detached, HEAD itself is rewritten.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let (target, _) = self.follow(HEAD_REF_NAME)?;
        self.write_ref(&target, oid)
    }

    /// Make HEAD a symbolic ref to `refs/heads/<branch>`
    pub fn set_head_branch(&self, branch: &str) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.head_path(),
            &format!("ref: {HEADS_PREFIX}{branch}\n"),
        )
    }

    pub fn write_ref(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.ref_path(name), &format!("{oid}\n"))?;
        tracing::debug!(name, %oid, "updated ref");
        Ok(())
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {}",
                path.display()
            )
        })?)?;

        std::fs::write(path, content)
            .with_context(|| format!("failed to write ref file at {}", path.display()))
    }

    /// Every ref under `refs/`, keyed by its path relative to the git directory
    ///
    /// Refs that do not resolve are skipped.
    pub fn enumerate_all_refs(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let mut refs = BTreeMap::new();

        for name in self.list_refs(&self.refs_path()) {
            match self.resolve(&name) {
                Ok(oid) => {
                    refs.insert(name, oid);
                }
                Err(err) => tracing::warn!(name = %name, error = %err, "skipping unresolvable ref"),
            }
        }

        Ok(refs)
    }

    fn list_refs(&self, path: &Path) -> Vec<String> {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                let segments = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_str())
                    .collect::<Option<Vec<_>>>()?;
                Some(segments.join("/"))
            })
            .collect()
    }

    pub fn save_tag(&self, name: &TagName, oid: &ObjectId) -> anyhow::Result<()> {
        let tag_ref = format!("{TAGS_PREFIX}{name}");
        if self.ref_path(&tag_ref).exists() {
            return Err(KitError::TagAlreadyExists(name.to_string()).into());
        }

        self.write_ref(&tag_ref, oid)
    }

    /// Remove a tag ref and return the object it pointed at
    pub fn delete_tag(&self, name: &TagName) -> anyhow::Result<ObjectId> {
        let tag_ref = format!("{TAGS_PREFIX}{name}");
        let tag_path = self.ref_path(&tag_ref);
        if !tag_path.is_file() {
            return Err(KitError::ObjectNotFound(tag_ref).into());
        }

        let oid = self.resolve(&tag_ref)?;
        std::fs::remove_file(&tag_path)
            .with_context(|| format!("failed to delete tag file at {}", tag_path.display()))?;
        tracing::debug!(name = %name, %oid, "deleted tag");

        Ok(oid)
    }

    /// Tag names, sorted
    pub fn list_tags(&self) -> anyhow::Result<Vec<String>> {
        Ok(self
            .list_refs(&self.refs_path().join("tags"))
            .into_iter()
            .filter_map(|name| name.strip_prefix(TAGS_PREFIX).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    const FIRST: &str = "95d09f2b10159347eece71399a7e2e907ea3df4f";
    const SECOND: &str = "bd9dbf5aae1a3862dd1526723246b20206e5fc37";

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex.to_string()).unwrap()
    }

    fn tag(name: &str) -> TagName {
        TagName::try_parse(name.to_string()).unwrap()
    }

    #[fixture]
    fn git_dir() -> assert_fs::TempDir {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("HEAD").write_str("ref: refs/heads/main\n").unwrap();
        dir.child("refs/heads").create_dir_all().unwrap();
        dir.child("refs/tags").create_dir_all().unwrap();
        dir
    }

    fn refs(dir: &assert_fs::TempDir) -> Refs {
        Refs::new(dir.path().into())
    }

    fn is_kit_error(err: &anyhow::Error, check: fn(&KitError) -> bool) -> bool {
        err.downcast_ref::<KitError>().is_some_and(check)
    }

    #[rstest]
    fn unborn_branch_has_no_head(git_dir: assert_fs::TempDir) {
        let refs = refs(&git_dir);

        assert_eq!(refs.read_head().unwrap(), None);
        assert_eq!(refs.current_branch().unwrap().as_deref(), Some("main"));
        assert!(!refs.is_detached().unwrap());
        let err = refs.resolve(HEAD_REF_NAME).unwrap_err();
        assert!(is_kit_error(&err, |e| matches!(e, KitError::ObjectNotFound(_))));
    }

    #[rstest]
    fn update_head_writes_through_to_the_branch(git_dir: assert_fs::TempDir) {
        let refs = refs(&git_dir);

        refs.update_head(&oid(FIRST)).unwrap();

        git_dir.child("refs/heads/main").assert(format!("{FIRST}\n"));
        git_dir.child("HEAD").assert("ref: refs/heads/main\n");
        assert_eq!(refs.resolve(HEAD_REF_NAME).unwrap(), oid(FIRST));
    }

    #[rstest]
    fn detached_head_is_rewritten_in_place(git_dir: assert_fs::TempDir) {
        git_dir.child("HEAD").write_str(FIRST).unwrap();
        let refs = refs(&git_dir);

        assert!(refs.is_detached().unwrap());
        assert_eq!(refs.current_branch().unwrap(), None);

        refs.update_head(&oid(SECOND)).unwrap();
        git_dir.child("HEAD").assert(format!("{SECOND}\n"));
    }

    #[rstest]
    fn symbolic_cycles_are_bounded(git_dir: assert_fs::TempDir) {
        git_dir.child("refs/heads/main").write_str("ref: refs/heads/other").unwrap();
        git_dir.child("refs/heads/other").write_str("ref: refs/heads/main").unwrap();

        let err = refs(&git_dir).resolve(HEAD_REF_NAME).unwrap_err();
        assert!(is_kit_error(&err, |e| matches!(e, KitError::RefCycle(_))));
    }

    #[rstest]
    fn chains_up_to_the_limit_resolve(git_dir: assert_fs::TempDir) {
        // HEAD -> main -> a -> b -> c -> d, five hops
        git_dir.child("refs/heads/main").write_str("ref: refs/heads/a").unwrap();
        git_dir.child("refs/heads/a").write_str("ref: refs/heads/b").unwrap();
        git_dir.child("refs/heads/b").write_str("ref: refs/heads/c").unwrap();
        git_dir.child("refs/heads/c").write_str("ref: refs/heads/d").unwrap();
        git_dir.child("refs/heads/d").write_str(FIRST).unwrap();

        assert_eq!(refs(&git_dir).resolve(HEAD_REF_NAME).unwrap(), oid(FIRST));
    }

    #[rstest]
    fn tags_are_created_once_listed_and_deleted(git_dir: assert_fs::TempDir) {
        let refs = refs(&git_dir);

        refs.save_tag(&tag("v1"), &oid(FIRST)).unwrap();
        refs.save_tag(&tag("v0"), &oid(SECOND)).unwrap();
        let err = refs.save_tag(&tag("v1"), &oid(SECOND)).unwrap_err();
        assert!(is_kit_error(&err, |e| matches!(e, KitError::TagAlreadyExists(_))));

        assert_eq!(refs.list_tags().unwrap(), vec!["v0", "v1"]);
        assert_eq!(refs.delete_tag(&tag("v1")).unwrap(), oid(FIRST));
        assert_eq!(refs.list_tags().unwrap(), vec!["v0"]);

        let err = refs.delete_tag(&tag("v1")).unwrap_err();
        assert!(is_kit_error(&err, |e| matches!(e, KitError::ObjectNotFound(_))));
    }

    #[rstest]
    fn all_refs_are_enumerated_and_broken_ones_skipped(git_dir: assert_fs::TempDir) {
        git_dir.child("refs/heads/main").write_str(FIRST).unwrap();
        git_dir.child("refs/heads/feature/x").write_str(SECOND).unwrap();
        git_dir.child("refs/heads/empty").touch().unwrap();
        git_dir.child("refs/tags/v1").write_str("ref: refs/heads/main").unwrap();

        let all = refs(&git_dir).enumerate_all_refs().unwrap();

        assert_eq!(
            all.into_iter().collect::<Vec<_>>(),
            vec![
                ("refs/heads/feature/x".to_string(), oid(SECOND)),
                ("refs/heads/main".to_string(), oid(FIRST)),
                ("refs/tags/v1".to_string(), oid(FIRST)),
            ]
        );
    }
}
