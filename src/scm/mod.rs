//! # Source Providers
//!
//! A source provider is the hosting service a catalogue is built from. It
//! lists an owner's repositories with the metadata the triage sheet records,
//! and it supplies the git operations used to clone from it (typically
//! carrying the provider's credentials).
//!
//! Only GitHub is implemented. Adding a provider means implementing
//! [`SourceProvider`] and registering a [`ProviderKind`].

pub mod github;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::materialize::{GitOperations, SystemGit};

/// Metadata for one repository as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteRepository {
    pub name: String,
    pub owner: String,
    /// Empty when the repository has no commits yet.
    pub default_branch: String,
    pub branch_names: Vec<String>,
    pub tag_names: Vec<String>,
    pub is_empty: bool,
    pub is_archived: bool,
    pub is_fork: bool,
    pub description: String,
    pub fork_count: i64,
    pub open_issue_count: i64,
    /// Timestamp of the last update, as the provider formats it.
    pub last_updated: String,
    /// Browser URL.
    pub url: String,
    pub clone_url: String,
    pub tag_count: i64,
    /// Empty when the repository has no tags.
    pub latest_tag: String,
}

/// A hosting service codetriage can catalogue and clone from.
pub trait SourceProvider {
    /// Short provider name, used in messages.
    fn name(&self) -> &str;

    /// Every repository `owner` (a user or an organisation) exposes.
    fn list_repositories(&self, owner: &str) -> Result<Vec<RemoteRepository>>;

    /// Git operations for cloning from this provider.
    fn git_operations(&self) -> Box<dyn GitOperations> {
        Box::new(SystemGit::new())
    }
}

/// The providers the command line can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Github,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Github => "github",
        }
    }
}

/// Build the provider adapter for `kind`.
///
/// `api_url` overrides the provider's public API endpoint (for example a
/// GitHub Enterprise server).
pub fn connect(
    kind: ProviderKind,
    token: &str,
    api_url: Option<&str>,
) -> Result<Box<dyn SourceProvider>> {
    if token.trim().is_empty() {
        return Err(Error::Authentication {
            message: format!("an access token is required for {}", kind.as_str()),
        });
    }

    match kind {
        ProviderKind::Github => {
            let api_url = api_url.unwrap_or(github::DEFAULT_API_URL);
            Ok(Box::new(github::GithubProvider::new(token, api_url)?))
        }
    }
}
