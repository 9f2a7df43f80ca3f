//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and macros
//! to reduce duplication across test files.
//!
//! The fixtures build real git repositories with the `git` binary inside a
//! temporary directory and serve them as `file://` remotes, so `pull` can be
//! exercised end to end without a network. Tests return early when `git` is
//! not installed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     require_git!();
//!     let fixture = TestFixture::new();
//!     let remote = fixture.remote("r1", "main").commit("first").branch("main2");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

use codetriage::record::Record;
use codetriage::schema::{keys, Schema};
use codetriage::tabular::TabularStore;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, triage_row, RemoteRepo, TestFixture};
    #[allow(unused_imports)]
    pub use crate::require_git;
}

/// Return from the test early when the `git` binary is missing.
#[macro_export]
macro_rules! require_git {
    () => {
        if !$crate::common::git_available() {
            eprintln!("git is not available, skipping");
            return;
        }
    };
}

/// Whether a usable `git` binary is on the PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=codetriage tests",
            "-c",
            "user.email=tests@codetriage.invalid",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A git repository acting as the remote for a pull.
pub struct RemoteRepo {
    path: PathBuf,
    commits: usize,
}

impl RemoteRepo {
    /// Initialise an empty repository whose HEAD names `default_branch`.
    pub fn init(path: PathBuf, default_branch: &str) -> Self {
        std::fs::create_dir_all(&path).expect("Failed to create remote dir");
        git(&path, &["init", "--quiet"]);
        git(
            &path,
            &["symbolic-ref", "HEAD", &format!("refs/heads/{}", default_branch)],
        );
        Self { path, commits: 0 }
    }

    /// Commit a new file on the checked-out branch.
    pub fn commit(mut self, message: &str) -> Self {
        self.commits += 1;
        let file = format!("file{}.txt", self.commits);
        std::fs::write(self.path.join(&file), message).expect("Failed to write file");
        git(&self.path, &["add", &file]);
        git(&self.path, &["commit", "--quiet", "-m", message]);
        self
    }

    /// Create a branch at HEAD with one extra commit, then return to the
    /// previous branch.
    pub fn branch(self, name: &str) -> Self {
        let previous = git(&self.path, &["symbolic-ref", "--short", "HEAD"]);
        git(&self.path, &["checkout", "--quiet", "-b", name]);
        let repo = self.commit(&format!("work on {}", name));
        git(&repo.path, &["checkout", "--quiet", &previous]);
        repo
    }

    /// Tag HEAD without a tag object.
    pub fn lightweight_tag(self, name: &str) -> Self {
        git(&self.path, &["tag", name]);
        self
    }

    /// Tag HEAD with an annotated tag object.
    pub fn annotated_tag(self, name: &str) -> Self {
        git(&self.path, &["tag", "-a", name, "-m", &format!("release {}", name)]);
        self
    }

    /// Annotated tag whose target is another tag.
    pub fn tag_of_tag(self, name: &str, target: &str) -> Self {
        git(
            &self.path,
            &[
                "tag",
                "-a",
                name,
                &format!("refs/tags/{}", target),
                "-m",
                &format!("{} points at {}", name, target),
            ],
        );
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// The commit `reference` designates in the remote.
    pub fn commit_of(&self, reference: &str) -> String {
        git(
            &self.path,
            &["rev-parse", "--verify", &format!("{}^{{commit}}", reference)],
        )
    }
}

/// A triage record marked the way an operator would mark it.
pub fn triage_row(
    name: &str,
    pull: &str,
    token: &str,
    default_branch: &str,
    clone_url: &str,
) -> Record {
    let mut record = Record::new(Schema::triage());
    record.set(keys::NAME, name).unwrap();
    record.set(keys::OWNER, "NullMode").unwrap();
    record.set(keys::PULL, pull).unwrap();
    record.set(keys::PULL_BRANCH_TAG, token).unwrap();
    record.set(keys::CLONE_URL, clone_url).unwrap();
    record.set(keys::DEFAULT_BRANCH, default_branch).unwrap();
    record
}

/// A test fixture that provides a temporary directory holding remotes,
/// triage files and pull destinations.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Start a remote repository under `remotes/<name>`.
    pub fn remote(&self, name: &str, default_branch: &str) -> RemoteRepo {
        RemoteRepo::init(self.path().join("remotes").join(name), default_branch)
    }

    /// Write `records` as a triage file and return its path.
    pub fn triage_file(&self, file_name: &str, records: &[Record]) -> PathBuf {
        let path = self.path().join(file_name);
        TabularStore::new(Schema::triage())
            .write(records, &path, true)
            .expect("Failed to write triage file");
        path
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Where `pull` clones to in these tests.
    pub fn destination(&self) -> PathBuf {
        self.path().join("repos")
    }

    /// Create a command configured to run in this fixture's directory, with
    /// no token inherited from the environment.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("codetriage");
        cmd.current_dir(self.path())
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
