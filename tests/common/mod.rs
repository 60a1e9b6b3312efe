#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use fake::Fake;
use fake::faker::internet::en::FreeEmail;
use fake::faker::name::en::Name;
use rstest::fixture;
use std::path::Path;

/// A scratch directory for the repository plus a private global configuration
pub struct Sandbox {
    pub dir: TempDir,
    pub home: TempDir,
    pub author_name: String,
    pub author_email: String,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            dir: TempDir::new().expect("Failed to create temp dir"),
            home: TempDir::new().expect("Failed to create temp dir"),
            author_name: Name().fake::<String>(),
            author_email: FreeEmail().fake::<String>(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_global_config(&self, content: &str) {
        self.home
            .child("gitconfig")
            .write_str(content)
            .expect("Failed to write global config");
    }

    /// Run `kit` in the repository directory, isolated from the host's git configuration
    pub fn kit(&self, args: &[&str]) -> Command {
        self.kit_in(self.path(), args)
    }

    pub fn kit_in(&self, cwd: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("kit").expect("Failed to find kit binary");
        cmd.current_dir(cwd)
            .env("GIT_CONFIG_GLOBAL", self.home.path().join("gitconfig"))
            .env("GIT_CONFIG_SYSTEM", self.home.path().join("system-gitconfig"))
            .env_remove("KIT_LOG")
            .args(args);
        cmd
    }

    pub fn write_file(&self, name: &str, content: &str) {
        self.dir
            .child(name)
            .write_str(content)
            .expect("Failed to write file");
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.kit(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output is not UTF-8")
    }
}

/// An empty directory with a configured user, not yet a repository
#[fixture]
pub fn sandbox() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox.write_global_config(&format!(
        "[user]\n\tname = {}\n\temail = {}\n",
        sandbox.author_name, sandbox.author_email
    ));
    sandbox
}

/// A freshly initialized repository with a configured user
#[fixture]
pub fn repository(sandbox: Sandbox) -> Sandbox {
    sandbox.kit(&["init"]).assert().success();
    sandbox
}
