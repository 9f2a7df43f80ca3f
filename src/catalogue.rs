//! Build triage records from a provider listing.

use log::info;

use crate::error::Result;
use crate::record::Record;
use crate::schema::{keys, Schema};
use crate::scm::{RemoteRepository, SourceProvider};

/// Map one repository onto a fresh record.
///
/// The operator columns (pull flag, branch/tag and notes) keep their blank
/// defaults.
pub fn record_from_repository(schema: Schema, repo: &RemoteRepository) -> Result<Record> {
    let mut record = Record::new(schema);
    record.set(keys::NAME, repo.name.as_str())?;
    record.set(keys::OWNER, repo.owner.as_str())?;
    record.set(keys::EMPTY, repo.is_empty)?;
    record.set(keys::ARCHIVED, repo.is_archived)?;
    record.set(keys::FORK, repo.is_fork)?;
    record.set(keys::DESCRIPTION, repo.description.as_str())?;
    record.set(keys::FORKS, repo.fork_count)?;
    record.set(keys::OPEN_ISSUES, repo.open_issue_count)?;
    record.set(keys::LAST_UPDATED, repo.last_updated.as_str())?;
    record.set(keys::URL, repo.url.as_str())?;
    record.set(keys::CLONE_URL, repo.clone_url.as_str())?;
    record.set(keys::DEFAULT_BRANCH, repo.default_branch.as_str())?;
    record.set(keys::BRANCH_LIST, repo.branch_names.join(","))?;
    record.set(keys::RELEASE_TAGS, repo.tag_count)?;
    record.set(keys::LATEST_TAG, repo.latest_tag.as_str())?;
    Ok(record)
}

/// Catalogue every repository `owner` exposes on `provider`.
pub fn catalogue(provider: &dyn SourceProvider, owner: &str, schema: Schema) -> Result<Vec<Record>> {
    info!("Listing repositories for {} on {}", owner, provider.name());
    let repos = provider.list_repositories(owner)?;
    let total = repos.len();

    repos
        .iter()
        .enumerate()
        .map(|(index, repo)| {
            info!("Processing repo: {} ({}/{})", repo.name, index + 1, total);
            record_from_repository(schema, repo)
        })
        .collect()
}
