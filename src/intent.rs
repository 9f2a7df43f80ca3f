//! # Pull Intent
//!
//! The subset of a triage record that `pull` acts on: where to clone from,
//! what to call the checkout, whether the operator asked for it, and which
//! revision to check out.

use std::fmt;

use crate::error::Result;
use crate::record::Record;
use crate::schema::keys;

/// The tri-state "Pull (Y/N)" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullFlag {
    Yes,
    No,
    Blank,
}

impl PullFlag {
    /// `y`/`yes` in any case is affirmative, an empty cell is blank and
    /// anything else is a refusal.
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            PullFlag::Blank
        } else if cell.eq_ignore_ascii_case("y") || cell.eq_ignore_ascii_case("yes") {
            PullFlag::Yes
        } else {
            PullFlag::No
        }
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self, PullFlag::Yes)
    }
}

/// The operator's "Pull Branch/Tag" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefToken {
    /// `*`: every remote branch.
    AllBranches,
    /// Blank: whatever the triage sheet recorded as the default branch.
    DefaultBranch,
    /// A branch name, falling back to a tag of the same name.
    Named(String),
}

impl RefToken {
    pub fn parse(cell: &str) -> Self {
        match cell.trim() {
            "" => RefToken::DefaultBranch,
            "*" => RefToken::AllBranches,
            name => RefToken::Named(name.to_string()),
        }
    }
}

impl fmt::Display for RefToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefToken::AllBranches => f.write_str("*"),
            RefToken::DefaultBranch => f.write_str("<default>"),
            RefToken::Named(name) => f.write_str(name),
        }
    }
}

/// What the resolution engine will actually try to check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Clone without requesting a ref; the remote's HEAD decides.
    RemoteDefault,
    AllBranches,
    /// Branch first, then tag.
    Named(String),
}

/// A request to materialize one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIntent {
    pub owner: String,
    pub name: String,
    pub clone_url: String,
    pub default_branch: String,
    pub token: RefToken,
    pub pull: PullFlag,
}

impl RepositoryIntent {
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            owner: record.text(keys::OWNER)?.trim().to_string(),
            name: record.text(keys::NAME)?.trim().to_string(),
            clone_url: record.text(keys::CLONE_URL)?.trim().to_string(),
            default_branch: record.text(keys::DEFAULT_BRANCH)?.trim().to_string(),
            token: RefToken::parse(record.text(keys::PULL_BRANCH_TAG)?),
            pull: PullFlag::parse(record.text(keys::PULL)?),
        })
    }

    /// Resolve a blank token against the recorded default branch.
    ///
    /// A repository catalogued while empty has no default branch; it is
    /// cloned in whatever state the remote offers.
    pub fn target(&self) -> Target {
        match &self.token {
            RefToken::AllBranches => Target::AllBranches,
            RefToken::Named(name) => Target::Named(name.clone()),
            RefToken::DefaultBranch if self.default_branch.is_empty() => Target::RemoteDefault,
            RefToken::DefaultBranch => Target::Named(self.default_branch.clone()),
        }
    }
}
