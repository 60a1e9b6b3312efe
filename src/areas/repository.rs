use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{HEAD_REF_NAME, HEADS_PREFIX, Refs, TAGS_PREFIX};
use crate::artifacts::config::ini_file::IniFile;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::refs::ref_name::is_valid_ref_name;
use crate::errors::KitError;
use anyhow::Context;
use derive_new::new;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

pub const GIT_DIR_NAME: &str = ".git";

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

const BRANCH_SECTION_REGEX: &str = r#"^branch "(.+)"$"#;

/// Shortest abbreviated hash accepted by [`Repository::find_object`]
pub const MIN_PREFIX_LENGTH: usize = 3;

/// Branch declared in the local configuration
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Branch {
    pub name: String,
    pub merge: Option<String>,
}

pub struct Repository {
    git_dir: Box<Path>,
    worktree: Box<Path>,
    branches: Vec<Branch>,
    detached: bool,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
    config: Config,
}

impl Repository {
    /// Create the on-disk layout of an empty repository in `dir/.git` and open it
    pub fn init(dir: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let git_dir = dir.join(GIT_DIR_NAME);
        if git_dir.exists() {
            return Err(KitError::RepositoryExists(git_dir).into());
        }

        for sub_dir in ["objects", "refs/heads", "refs/tags", "branches"] {
            let path = git_dir.join(sub_dir);
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Unable to create directory {}", path.display()))?;
        }

        let mut config = IniFile::default();
        config.set("core", "repositoryformatversion", "0");
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
        config.write(&git_dir.join("config"))?;

        std::fs::write(git_dir.join("description"), DEFAULT_DESCRIPTION)
            .context("Unable to write repository description")?;

        let default_branch = Config::global()?
            .get("init", "defaultBranch")
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        Refs::new(git_dir.clone().into_boxed_path()).set_head_branch(&default_branch)?;

        tracing::info!(git_dir = %git_dir.display(), branch = %default_branch, "initialized repository");
        Self::open(dir, writer)
    }

    /// Open the repository whose `.git` directory is directly inside `dir`
    pub fn open(dir: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let git_dir = dir.join(GIT_DIR_NAME);
        if !git_dir.is_dir() {
            return Err(KitError::NoRepository(dir.to_path_buf()).into());
        }

        let config = Config::load(&git_dir.join("config"))?;
        let worktree = config
            .local()
            .get("core", "worktree")
            .map(|worktree| git_dir.join(worktree))
            .unwrap_or_else(|| dir.to_path_buf());
        let branches = Self::configured_branches(config.local())?;

        let refs = Refs::new(git_dir.clone().into_boxed_path());
        let detached = refs.is_detached()?;

        Ok(Repository {
            database: Database::new(git_dir.join("objects").into_boxed_path()),
            git_dir: git_dir.into_boxed_path(),
            worktree: worktree.into_boxed_path(),
            branches,
            detached,
            writer: RefCell::new(writer),
            refs,
            config,
        })
    }

    /// Open the repository containing `start`, looking in `start` and then each ancestor
    pub fn find(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", start.display()))?;

        match start.ancestors().find(|dir| dir.join(GIT_DIR_NAME).is_dir()) {
            Some(dir) => Self::open(dir, writer),
            None => Err(KitError::NoRepositoryFound(start).into()),
        }
    }

    fn configured_branches(local: &IniFile) -> anyhow::Result<Vec<Branch>> {
        let regex = regex::Regex::new(BRANCH_SECTION_REGEX)?;

        Ok(local
            .sections()
            .filter_map(|section| {
                let name = regex.captures(section)?[1].to_string();
                let merge = local.get(section, "merge").map(str::to_string);
                Some(Branch::new(name, merge))
            })
            .collect())
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub fn load_index(&self) -> anyhow::Result<Index> {
        Index::load(&self.index_path())
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a user supplied name to an object ID
    ///
    /// Tried in order: `HEAD`, a branch, a tag, then an unambiguous abbreviated hash.
    pub fn find_object(&self, query: &str) -> anyhow::Result<ObjectId> {
        if query == HEAD_REF_NAME {
            return self.refs.resolve(HEAD_REF_NAME);
        }

        if is_valid_ref_name(query)? {
            for prefix in [HEADS_PREFIX, TAGS_PREFIX] {
                let name = format!("{prefix}{query}");
                if self.git_dir.join(&name).is_file() {
                    return self.refs.resolve(&name);
                }
            }
        }

        if query.len() >= MIN_PREFIX_LENGTH {
            let mut candidates = self.database.find_by_prefix(query)?;
            match candidates.len() {
                1 => return Ok(candidates.remove(0)),
                0 => {}
                _ => {
                    tracing::debug!(query, candidates = ?candidates, "ambiguous abbreviated hash");
                    return Err(anyhow::Error::from(KitError::ObjectNotFound(query.to_string()))
                        .context(format!("short object ID {query} is ambiguous")));
                }
            }
        }

        Err(KitError::ObjectNotFound(query.to_string()).into())
    }
}
