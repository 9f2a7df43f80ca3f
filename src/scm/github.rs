//! GitHub source provider.
//!
//! Talks to the GitHub REST API with a blocking `reqwest` client. Every list
//! endpoint is paginated by following the `Link: <...>; rel="next"` header.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, LINK};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{RemoteRepository, SourceProvider};
use crate::error::{Error, Result};
use crate::materialize::{GitOperations, SystemGit};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PROVIDER: &str = "github";
const PER_PAGE: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    owner: ApiOwner,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    open_issues_count: i64,
    #[serde(default)]
    updated_at: Option<String>,
    html_url: String,
    clone_url: String,
    #[serde(default)]
    size: u64,
}

/// Branches and tags both list as `{"name": ...}` objects.
#[derive(Debug, Deserialize)]
struct ApiNamed {
    name: String,
}

impl ApiRepository {
    fn into_remote(self, branches: Vec<ApiNamed>, tags: Vec<ApiNamed>) -> RemoteRepository {
        let branch_names: Vec<String> = branches.into_iter().map(|b| b.name).collect();
        let tag_names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
        let is_empty = self.size == 0 || branch_names.is_empty();

        // GitHub reports a default branch name even before the first push.
        let default_branch = if is_empty {
            String::new()
        } else {
            self.default_branch.unwrap_or_default()
        };

        RemoteRepository {
            name: self.name,
            owner: self.owner.login,
            default_branch,
            is_empty,
            is_archived: self.archived,
            is_fork: self.fork,
            description: self.description.unwrap_or_default(),
            fork_count: self.forks_count,
            open_issue_count: self.open_issues_count,
            last_updated: self.updated_at.unwrap_or_default(),
            url: self.html_url,
            clone_url: self.clone_url,
            tag_count: tag_names.len() as i64,
            latest_tag: tag_names.first().cloned().unwrap_or_default(),
            branch_names,
            tag_names,
        }
    }
}

/// A GitHub (or GitHub Enterprise) account.
pub struct GithubProvider {
    http: Client,
    token: String,
    api_url: Url,
}

impl GithubProvider {
    pub fn new(token: &str, api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        let http = Client::builder()
            .user_agent(concat!("codetriage/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            token: token.trim().to_string(),
            api_url,
        })
    }

    /// The web host clone URLs point at, e.g. `https://github.com/`.
    pub fn web_url(&self) -> String {
        web_base(&self.api_url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Provider {
                provider: PROVIDER.to_string(),
                message: format!("{} cannot be used as an API base URL", self.api_url),
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("per_page", PER_PAGE);
        Ok(url)
    }

    /// GET every page of a list endpoint.
    fn get_all<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first.to_string());

        while let Some(url) = next.take() {
            debug!("GET {}", url);
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/vnd.github+json")
                .send()
                .map_err(|e| Error::Network {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            // 409: the repository has no commits, so nothing to list.
            if status == StatusCode::CONFLICT {
                break;
            }
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(api_error(status, &url, &body));
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page);
            let page: Vec<T> = response.json()?;
            items.extend(page);
        }

        Ok(items)
    }
}

impl SourceProvider for GithubProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn list_repositories(&self, owner: &str) -> Result<Vec<RemoteRepository>> {
        let repos: Vec<ApiRepository> = self.get_all(self.endpoint(&["users", owner, "repos"])?)?;
        let mut listed = Vec::with_capacity(repos.len());

        for repo in repos {
            let login = repo.owner.login.clone();
            debug!("Gathering branch information for {}", repo.name);
            let branches: Vec<ApiNamed> =
                self.get_all(self.endpoint(&["repos", &login, &repo.name, "branches"])?)?;

            debug!("Gathering tag information for {}", repo.name);
            let tags = self
                .endpoint(&["repos", &login, &repo.name, "tags"])
                .and_then(|url| self.get_all::<ApiNamed>(url))
                .unwrap_or_else(|e| {
                    warn!("Could not list tags for {}: {}", repo.name, e);
                    Vec::new()
                });

            listed.push(repo.into_remote(branches, tags));
        }

        Ok(listed)
    }

    fn git_operations(&self) -> Box<dyn GitOperations> {
        Box::new(SystemGit::new().with_config(
            format!("http.{}.extraHeader", self.web_url()),
            authorization_header(&self.token),
        ))
    }
}

fn api_error(status: StatusCode, url: &str, body: &str) -> Error {
    let snippet: String = body.chars().take(200).collect();
    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication {
            message: "GitHub rejected the access token".to_string(),
        },
        StatusCode::FORBIDDEN if body.to_ascii_lowercase().contains("rate limit") => {
            Error::Provider {
                provider: PROVIDER.to_string(),
                message: format!("API rate limit exceeded: {}", snippet),
            }
        }
        StatusCode::FORBIDDEN => Error::Authentication {
            message: format!("access to {} was denied: {}", url, snippet),
        },
        StatusCode::NOT_FOUND => Error::Provider {
            provider: PROVIDER.to_string(),
            message: format!("{} not found", url),
        },
        _ => Error::Provider {
            provider: PROVIDER.to_string(),
            message: format!("{} from {}: {}", status, url, snippet),
        },
    }
}

/// Extract the `rel="next"` target of a `Link` header.
fn next_page(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|p| p.trim() == r#"rel="next""#);
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

/// `api.github.com` serves `github.com`; Enterprise servers host the API
/// under `/api/v3` on the web host itself.
fn web_base(api_url: &Url) -> String {
    let host = api_url.host_str().unwrap_or_default();
    let host = host.strip_prefix("api.").unwrap_or(host);
    match api_url.port() {
        Some(port) => format!("{}://{}:{}/", api_url.scheme(), host, port),
        None => format!("{}://{}/", api_url.scheme(), host),
    }
}

/// The header git sends when cloning over HTTPS with a token.
fn authorization_header(token: &str) -> String {
    let credentials = STANDARD.encode(format!("x-access-token:{}", token));
    format!("Authorization: Basic {}", credentials)
}
