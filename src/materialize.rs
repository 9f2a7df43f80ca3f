//! # Repository Materialization
//!
//! This module turns [`RepositoryIntent`]s into working copies on disk. It
//! owns the decision of what to check out for a human-supplied token and the
//! guarantee that every repository ends in a well-defined state: either a
//! working copy at the resolved revision, or no directory at all.
//!
//! ## Design
//!
//! Git access goes through the [`GitOperations`] trait so the resolution
//! logic can be exercised without a network or even a `git` binary. The
//! production implementation, [`SystemGit`], wraps [`crate::git`].
//!
//! ## Resolution
//!
//! For each intent the [`Materializer`]:
//!
//! 1.  Skips it unless the pull flag is affirmative, without touching disk.
//! 2.  For `*`, clones at the remote default and creates a local branch for
//!     every remote branch that has none yet. Symbolic references such as
//!     `origin/HEAD` are not branches and are left out.
//! 3.  For a blank token, uses the recorded default branch (or the remote
//!     default when nothing was recorded).
//! 4.  For a name, clones with that branch checked out. If the remote has no
//!     such branch the partial clone is removed, the repository is cloned
//!     again at its default, tags are fetched and the name is looked up as a
//!     tag; a match is checked out detached at the tag's commit.
//! 5.  On any failure removes what it created, records the reason and moves
//!     on. One repository never stops the batch.
//!
//! Processing is sequential and each destination is claimed at most once per
//! run.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::git::{self, ConfigPair, RemoteBranch};
use crate::intent::{RepositoryIntent, Target};

/// Trait for the git operations materialization needs - allows mocking in tests
pub trait GitOperations {
    /// Clones a repository, optionally with `branch` checked out.
    ///
    /// Must fail with `Error::RefNotFound` (and nothing else) when the remote
    /// has no branch of that name.
    fn clone_repository(&self, url: &str, target_dir: &Path, branch: Option<&str>) -> Result<()>;

    /// Fetches every tag of the origin remote into the working copy.
    fn fetch_tags(&self, repo_dir: &Path) -> Result<()>;

    /// Resolves a tag to its commit, following tag-to-tag pointers.
    fn resolve_tag(&self, repo_dir: &Path, tag: &str) -> Result<Option<String>>;

    /// Moves the working copy to `commit` without a branch.
    fn checkout_detached(&self, repo_dir: &Path, commit: &str) -> Result<()>;

    /// Lists the remote-tracking references of the working copy.
    fn remote_branches(&self, repo_dir: &Path) -> Result<Vec<RemoteBranch>>;

    /// Lists the local branch names of the working copy.
    fn local_branches(&self, repo_dir: &Path) -> Result<Vec<String>>;

    /// Creates a local branch at `start_point`.
    fn create_branch(&self, repo_dir: &Path, name: &str, start_point: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which runs the system's
/// `git` command.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    config: Vec<ConfigPair>,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds git configuration applied to network operations (clone, fetch).
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }
}

impl GitOperations for SystemGit {
    fn clone_repository(&self, url: &str, target_dir: &Path, branch: Option<&str>) -> Result<()> {
        git::clone(url, target_dir, branch, &self.config)
    }

    fn fetch_tags(&self, repo_dir: &Path) -> Result<()> {
        git::fetch_tags(repo_dir, &self.config)
    }

    fn resolve_tag(&self, repo_dir: &Path, tag: &str) -> Result<Option<String>> {
        git::resolve_tag(repo_dir, tag)
    }

    fn checkout_detached(&self, repo_dir: &Path, commit: &str) -> Result<()> {
        git::checkout_detached(repo_dir, commit)
    }

    fn remote_branches(&self, repo_dir: &Path) -> Result<Vec<RemoteBranch>> {
        git::remote_branches(repo_dir)
    }

    fn local_branches(&self, repo_dir: &Path) -> Result<Vec<String>> {
        git::local_branches(repo_dir)
    }

    fn create_branch(&self, repo_dir: &Path, name: &str, start_point: &str) -> Result<()> {
        git::create_branch(repo_dir, name, start_point)
    }
}

/// What ended up checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkout {
    /// The remote's default state, no ref requested.
    Default,
    Branch(String),
    /// One local branch per remote branch; `created` of them were added.
    AllBranches { created: usize, total: usize },
    DetachedTag { tag: String, commit: String },
}

impl fmt::Display for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkout::Default => f.write_str("default branch"),
            Checkout::Branch(name) => write!(f, "branch {}", name),
            Checkout::AllBranches { total, .. } => write!(f, "all {} branches", total),
            Checkout::DetachedTag { tag, commit } => {
                let short = commit.get(..12).unwrap_or(commit);
                write!(f, "tag {} ({})", tag, short)
            }
        }
    }
}

/// Why a repository was not materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotRequested,
    InvalidName(String),
    MissingCloneUrl,
    /// An earlier row in the same run already used this destination.
    DuplicateDestination,
    /// Something is already on disk at the destination.
    DestinationExists,
    NoSuchRef(String),
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotRequested => f.write_str("not requested"),
            SkipReason::InvalidName(name) => {
                write!(f, "'{}' is not a usable directory name", name)
            }
            SkipReason::MissingCloneUrl => f.write_str("no clone URL"),
            SkipReason::DuplicateDestination => {
                f.write_str("destination already used by an earlier row")
            }
            SkipReason::DestinationExists => f.write_str("destination already exists"),
            SkipReason::NoSuchRef(token) => write!(f, "no such branch or tag '{}'", token),
            SkipReason::Failed(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Materialized(Checkout),
    Skipped(SkipReason),
}

/// The per-repository result of a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub name: String,
    pub destination: PathBuf,
    pub outcome: Outcome,
}

impl Report {
    pub fn is_materialized(&self) -> bool {
        matches!(self.outcome, Outcome::Materialized(_))
    }
}

/// Resolves intents to working copies under one destination directory.
pub struct Materializer {
    git_ops: Box<dyn GitOperations>,
    destination_root: PathBuf,
    claimed: HashSet<PathBuf>,
}

impl Materializer {
    /// Creates a `Materializer` that runs the system `git`.
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self::with_operations(Box::new(SystemGit::new()), destination_root)
    }

    /// Creates a `Materializer` with a custom `GitOperations` implementation.
    pub fn with_operations(
        git_ops: Box<dyn GitOperations>,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            git_ops,
            destination_root: destination_root.into(),
            claimed: HashSet::new(),
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Materialize every intent in order.
    pub fn materialize_all<I>(&mut self, intents: I) -> Vec<Report>
    where
        I: IntoIterator<Item = RepositoryIntent>,
    {
        intents
            .into_iter()
            .map(|intent| self.materialize(&intent))
            .collect()
    }

    /// Materialize one repository. Never fails: problems become a skip.
    pub fn materialize(&mut self, intent: &RepositoryIntent) -> Report {
        let destination = self.destination_root.join(&intent.name);
        let outcome = self.resolve(intent, &destination);

        match &outcome {
            Outcome::Materialized(checkout) => info!(
                "Repo {} pulled to {} ({})",
                intent.name,
                destination.display(),
                checkout
            ),
            Outcome::Skipped(SkipReason::NotRequested) => {
                debug!("Repo {} not marked for pull", intent.name)
            }
            Outcome::Skipped(reason) => warn!("Skipping {}: {}", intent.name, reason),
        }

        Report {
            name: intent.name.clone(),
            destination,
            outcome,
        }
    }

    fn resolve(&mut self, intent: &RepositoryIntent, destination: &Path) -> Outcome {
        if !intent.pull.is_affirmative() {
            return Outcome::Skipped(SkipReason::NotRequested);
        }
        if !is_single_component(&intent.name) {
            return Outcome::Skipped(SkipReason::InvalidName(intent.name.clone()));
        }
        if intent.clone_url.is_empty() {
            return Outcome::Skipped(SkipReason::MissingCloneUrl);
        }
        if !self.claimed.insert(destination.to_path_buf()) {
            return Outcome::Skipped(SkipReason::DuplicateDestination);
        }
        if destination.exists() {
            return Outcome::Skipped(SkipReason::DestinationExists);
        }

        info!("Pulling repo: {}...", intent.name);
        let url = intent.clone_url.as_str();
        let result = match intent.target() {
            Target::RemoteDefault => self
                .git_ops
                .clone_repository(url, destination, None)
                .map(|()| Checkout::Default),
            Target::AllBranches => self.checkout_all_branches(url, destination),
            Target::Named(name) => self.checkout_branch_or_tag(url, destination, &name),
        };

        match result {
            Ok(checkout) => Outcome::Materialized(checkout),
            Err(error) => {
                remove_partial(destination);
                match error {
                    Error::RefNotFound { r#ref, .. } => {
                        Outcome::Skipped(SkipReason::NoSuchRef(r#ref))
                    }
                    other => Outcome::Skipped(SkipReason::Failed(other.to_string())),
                }
            }
        }
    }

    fn checkout_all_branches(&self, url: &str, destination: &Path) -> Result<Checkout> {
        self.git_ops.clone_repository(url, destination, None)?;

        let mut local: HashSet<String> =
            self.git_ops.local_branches(destination)?.into_iter().collect();
        let mut created = 0;

        for branch in self.git_ops.remote_branches(destination)? {
            if branch.symbolic || branch.name == "HEAD" {
                continue;
            }
            if local.contains(&branch.name) {
                continue;
            }
            self.git_ops
                .create_branch(destination, &branch.name, &branch.reference)?;
            local.insert(branch.name);
            created += 1;
        }

        Ok(Checkout::AllBranches {
            created,
            total: local.len(),
        })
    }

    fn checkout_branch_or_tag(&self, url: &str, destination: &Path, name: &str) -> Result<Checkout> {
        match self.git_ops.clone_repository(url, destination, Some(name)) {
            Ok(()) => return Ok(Checkout::Branch(name.to_string())),
            Err(Error::RefNotFound { .. }) => {
                debug!("No branch '{}' in {}, looking for a tag", name, url);
            }
            Err(other) => return Err(other),
        }

        remove_partial(destination);
        self.git_ops.clone_repository(url, destination, None)?;
        self.git_ops.fetch_tags(destination)?;

        let commit = self
            .git_ops
            .resolve_tag(destination, name)?
            .ok_or_else(|| Error::RefNotFound {
                url: url.to_string(),
                r#ref: name.to_string(),
            })?;
        self.git_ops.checkout_detached(destination, &commit)?;

        Ok(Checkout::DetachedTag {
            tag: name.to_string(),
            commit,
        })
    }
}

/// A repository name must map to exactly one directory under the root.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn remove_partial(destination: &Path) {
    if !destination.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(destination) {
        warn!(
            "Could not remove partial clone at {}: {}",
            destination.display(),
            e
        );
    }
}
