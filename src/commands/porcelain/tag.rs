use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{GitObject, Object};
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::refs::ref_name::TagName;
use anyhow::bail;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub name: Option<String>,
    /// Object to tag, HEAD when absent
    pub object: Option<String>,
    /// Annotation message; makes the tag an object of its own
    pub message: Option<String>,
    pub delete: bool,
}

impl Repository {
    pub fn tag(&self, options: &TagOptions) -> anyhow::Result<()> {
        if options.delete && options.message.is_some() {
            bail!("usage: -m cannot be combined with -d");
        }

        match (&options.name, options.delete) {
            (None, false) => self.list_tags(),
            (None, true) => bail!("usage: tag -d <name>"),
            (Some(name), true) => self.delete_tag(&TagName::try_parse(name.clone())?),
            (Some(name), false) => {
                let target = options.object.as_deref().unwrap_or(HEAD_REF_NAME);
                self.create_tag(&TagName::try_parse(name.clone())?, target, options.message.as_deref())
            }
        }
    }

    fn list_tags(&self) -> anyhow::Result<()> {
        for tag in self.refs().list_tags()? {
            writeln!(self.writer(), "{tag}")?;
        }

        Ok(())
    }

    fn create_tag(&self, name: &TagName, target: &str, message: Option<&str>) -> anyhow::Result<()> {
        let target_oid = self.find_object(target)?;

        let tag_oid = match message {
            None => target_oid,
            Some(message) => {
                let target_type = self.database().load(&target_oid)?.object_type();
                let tag = Tag::new(
                    target_oid,
                    target_type,
                    name.to_string(),
                    Some(self.identity()?),
                    message.trim_end_matches('\n').to_string(),
                );
                self.database().save(&tag)?
            }
        };

        self.refs().save_tag(name, &tag_oid)?;
        tracing::debug!(name = %name, oid = %tag_oid, annotated = message.is_some(), "created tag");

        Ok(())
    }

    fn delete_tag(&self, name: &TagName) -> anyhow::Result<()> {
        let tag_oid = self.refs().delete_tag(name)?;

        // annotated tags own their tag object
        if let Ok(GitObject::Tag(_)) = self.database().load(&tag_oid) {
            self.database().delete(&tag_oid)?;
        }

        writeln!(
            self.writer(),
            "Deleted tag '{}' (was {})",
            name,
            tag_oid.to_short_oid()
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::KitError;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> (assert_fs::TempDir, Repository) {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child(".git/objects").create_dir_all().unwrap();
        dir.child(".git/refs/tags").create_dir_all().unwrap();
        dir.child(".git/HEAD").write_str("ref: refs/heads/main\n").unwrap();
        dir.child(".git/config")
            .write_str("[user]\n\tname = Simon Taye\n\temail = mulat.simon@gmail.com\n")
            .unwrap();
        dir.child("a.txt").write_str("hello world").unwrap();

        let repository = Repository::open(dir.path(), Box::new(std::io::sink())).unwrap();
        repository.add(dir.path(), &["a.txt".to_string()]).unwrap();
        repository.commit("initial").unwrap();
        (dir, repository)
    }

    fn options(name: &str, message: Option<&str>, delete: bool) -> TagOptions {
        TagOptions {
            name: Some(name.to_string()),
            object: None,
            message: message.map(str::to_string),
            delete,
        }
    }

    #[rstest]
    fn lightweight_tag_points_at_head(repository: (assert_fs::TempDir, Repository)) {
        let (_dir, repository) = repository;
        let head = repository.refs().read_head().unwrap().unwrap();

        repository.tag(&options("v1", None, false)).unwrap();

        assert_eq!(repository.refs().resolve("refs/tags/v1").unwrap(), head);
        let err = repository.tag(&options("v1", None, false)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KitError>(),
            Some(KitError::TagAlreadyExists(_))
        ));
    }

    #[rstest]
    fn annotated_tag_is_stored_and_deleted_with_its_ref(repository: (assert_fs::TempDir, Repository)) {
        let (_dir, repository) = repository;
        let head = repository.refs().read_head().unwrap().unwrap();

        repository.tag(&options("v2", Some("Release"), false)).unwrap();
        let tag_oid = repository.refs().resolve("refs/tags/v2").unwrap();
        let tag = match repository.database().load(&tag_oid).unwrap() {
            GitObject::Tag(tag) => tag,
            other => panic!("expected a tag, got {other:?}"),
        };
        assert_eq!(tag.object_oid(), &head);
        assert_eq!(tag.name(), "v2");
        assert_eq!(tag.tagger().unwrap().name(), "Simon Taye");

        repository.tag(&options("v2", None, true)).unwrap();

        assert!(repository.refs().list_tags().unwrap().is_empty());
        assert!(!repository.database().exists(&tag_oid));
        assert!(repository.database().exists(&head));
    }

    #[rstest]
    fn message_and_delete_do_not_mix(repository: (assert_fs::TempDir, Repository)) {
        let (_dir, repository) = repository;

        assert!(repository.tag(&options("v3", Some("msg"), true)).is_err());
    }

    #[rstest]
    fn tag_names_that_leave_refs_tags_are_rejected(repository: (assert_fs::TempDir, Repository)) {
        let (dir, repository) = repository;

        for name in ["../../HEAD", "../escaped"] {
            let err = repository.tag(&options(name, None, true)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<KitError>(),
                Some(KitError::InvalidRefName(_))
            ));
            let err = repository.tag(&options(name, None, false)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<KitError>(),
                Some(KitError::InvalidRefName(_))
            ));
        }

        dir.child(".git/HEAD").assert(predicates::path::exists());
        dir.child(".git/refs/escaped").assert(predicates::path::missing());
    }
}
