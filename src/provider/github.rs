//! Repository provider backed by the GitHub REST API

use super::{normalize_pattern, RepositoryProvider};
use crate::config::NetworkConfig;
use crate::error::{Result, VerifyError};
use crate::types::{CommitInfo, Readme, RepositoryMetadata, TreeEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const SERVICE: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    full_name: String,
    html_url: String,
    description: Option<String>,
    stargazers_count: u32,
    forks_count: u32,
    language: Option<String>,
    license: Option<GitHubLicense>,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    fork: bool,
    parent: Option<GitHubParent>,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GitHubLicense {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubParent {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubStars {
    stargazers_count: u32,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// `/contents/{path}` returns an array for directories and an object for files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentListing {
    Many(Vec<ContentItem>),
    One(ContentItem),
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
    committer: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: String,
}

/// GitHub-backed [`RepositoryProvider`]
pub struct GitHubProvider {
    client: Client,
    config: NetworkConfig,
}

impl GitHubProvider {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn repo_url(&self, repo: &RepositoryMetadata, suffix: &str) -> String {
        self.url(&format!("/repos/{}{}", repo.full_name, suffix))
    }

    /// GET with retry; 404 is returned as `None`
    async fn get(&self, url: &str, accept: Option<&str>) -> Result<Option<Response>> {
        let mut attempts = 0;
        let mut delay = self.config.request_delay();

        loop {
            debug!("GET {}", url);
            let mut request = self.client.get(url);
            if let Some(accept) = accept {
                request = request.header(reqwest::header::ACCEPT, accept);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if is_rate_limited(&response) {
                        return Err(VerifyError::RateLimitExceeded {
                            service: SERVICE.to_string(),
                            retry_after: retry_after(&response),
                        });
                    }
                    if status.is_server_error() && attempts < self.config.max_retries {
                        warn!("GitHub returned {}, retrying: {}", status, url);
                    } else if !status.is_success() {
                        return Err(VerifyError::api(SERVICE, format!("HTTP {}", status)));
                    } else {
                        return Ok(Some(response));
                    }
                }
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        return Err(VerifyError::network(format!("GitHub request failed: {}", e)));
                    }
                    warn!("GitHub request failed, retrying: {}", e);
                }
            }

            tokio::time::sleep(delay).await;
            attempts += 1;
            delay *= 2;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        match self.get(url, None).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// Count paginated items by requesting one per page and reading the last page
    async fn count_items(&self, url: &str) -> Result<u32> {
        let Some(response) = self.get(url, None).await? else {
            return Ok(0);
        };
        // Empty repositories answer with 204 and no body
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(0);
        }

        if let Some(last_page) = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(extract_last_page)
        {
            return Ok(last_page);
        }

        let items: Vec<serde_json::Value> = response.json().await?;
        Ok(items.len() as u32)
    }
}

#[async_trait]
impl RepositoryProvider for GitHubProvider {
    async fn resolve_repository(&self, identifier: &str) -> Result<RepositoryMetadata> {
        let (owner, name) = parse_github_identifier(identifier)?;
        debug!("Fetching GitHub metadata for {}/{}", owner, name);

        let url = self.url(&format!("/repos/{}/{}", owner, name));
        let repo: GitHubRepo = self
            .get_json(&url)
            .await?
            .ok_or_else(|| VerifyError::not_found(format!("{}/{}", owner, name)))?;

        Ok(RepositoryMetadata {
            name: repo.name,
            full_name: repo.full_name,
            url: repo.html_url,
            description: repo.description,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language,
            license: repo.license.map(|l| l.name),
            created_at: parse_github_datetime(&repo.created_at)?,
            updated_at: parse_github_datetime(&repo.updated_at)?,
            topics: repo.topics,
            fork: repo.fork,
            parent: repo.parent.map(|p| p.full_name),
            size_kb: repo.size,
        })
    }

    async fn parent_star_count(&self, repo: &RepositoryMetadata) -> Result<Option<u32>> {
        let Some(parent) = repo.parent.as_deref().filter(|_| repo.fork) else {
            return Ok(None);
        };
        let url = self.url(&format!("/repos/{}", parent));
        let stars: Option<GitHubStars> = self.get_json(&url).await?;
        Ok(stars.map(|s| s.stargazers_count))
    }

    async fn contributor_count(&self, repo: &RepositoryMetadata) -> Result<u32> {
        self.count_items(&self.repo_url(repo, "/contributors?per_page=1&anon=true"))
            .await
    }

    async fn any_file_exists(&self, repo: &RepositoryMetadata, patterns: &[String]) -> Result<bool> {
        for pattern in patterns {
            let path = normalize_pattern(pattern);
            if path.is_empty() {
                continue;
            }
            let url = self.repo_url(repo, &format!("/contents/{}", encode_path(path)));
            if self.get(&url, None).await?.is_some() {
                debug!("Found '{}' in {}", path, repo.full_name);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn list_tree(&self, repo: &RepositoryMetadata, path: &str) -> Result<Vec<TreeEntry>> {
        let path = path.trim_matches('/');
        let suffix = if path.is_empty() {
            "/contents".to_string()
        } else {
            format!("/contents/{}", encode_path(path))
        };
        let url = self.repo_url(repo, &suffix);
        let listing: ContentListing = self
            .get_json(&url)
            .await?
            .ok_or_else(|| VerifyError::unavailable(format!("no such path: {}", path)))?;

        let items = match listing {
            ContentListing::Many(items) => items,
            ContentListing::One(item) => vec![item],
        };
        Ok(items
            .into_iter()
            .map(|item| match item.kind.as_str() {
                "dir" => TreeEntry::dir(item.path),
                _ => TreeEntry::file(item.path),
            })
            .collect())
    }

    async fn fetch_readme(&self, repo: &RepositoryMetadata) -> Result<Option<Readme>> {
        let url = self.repo_url(repo, "/readme");
        match self.get(&url, Some("application/vnd.github.raw")).await? {
            Some(response) => {
                let bytes = response.bytes().await?;
                Ok(Some(Readme {
                    size_bytes: bytes.len() as u64,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }))
            }
            None => Ok(None),
        }
    }

    async fn recent_commits(&self, repo: &RepositoryMetadata, limit: usize) -> Result<Vec<CommitInfo>> {
        let url = self.repo_url(repo, &format!("/commits?per_page={}", limit.clamp(1, 100)));
        let commits: Vec<GitHubCommit> = self.get_json(&url).await?.unwrap_or_default();

        commits
            .into_iter()
            .take(limit)
            .filter_map(|c| c.commit.author.or(c.commit.committer))
            .map(|a| {
                parse_github_datetime(&a.date).map(|timestamp| CommitInfo { timestamp })
            })
            .collect()
    }

    async fn release_count(&self, repo: &RepositoryMetadata) -> Result<u32> {
        self.count_items(&self.repo_url(repo, "/releases?per_page=1")).await
    }
}

/// Parse a repository identifier into owner and name
fn parse_github_identifier(identifier: &str) -> Result<(String, String)> {
    // Accepted forms:
    // - owner/repo
    // - https://github.com/owner/repo
    // - https://github.com/owner/repo.git
    // - git@github.com:owner/repo.git

    let id = identifier.trim();
    let id = id.trim_end_matches('/');
    let id = id.trim_end_matches(".git");

    let path = if let Some((_, rest)) = id.split_once("github.com:") {
        rest
    } else if let Some((_, rest)) = id.split_once("github.com/") {
        rest
    } else if !id.contains("://") {
        id
    } else {
        return Err(VerifyError::parse(format!("GitHub identifier: {}", identifier)));
    };

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() >= 2 {
        Ok((parts[0].to_string(), parts[1].to_string()))
    } else {
        Err(VerifyError::parse(format!("GitHub identifier: {}", identifier)))
    }
}

/// Build HTTP client with GitHub authentication if available
fn build_client(config: &NetworkConfig) -> Result<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
    );

    if let Some(token) = &config.github_token {
        let value: reqwest::header::HeaderValue = format!("Bearer {}", token)
            .parse()
            .map_err(|_| VerifyError::config("GitHub token contains invalid characters"))?;
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| VerifyError::network(format!("Failed to build HTTP client: {}", e)))
}

fn is_rate_limited(response: &Response) -> bool {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .map(|reset| {
            let wait = reset.saturating_sub(Utc::now().timestamp()).max(0);
            Duration::from_secs(wait as u64)
        })
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract last page number from Link header
fn extract_last_page(link_header: &str) -> Option<u32> {
    for link in link_header.split(',') {
        if link.contains("rel=\"last\"") {
            // The page parameter may be followed by other query parameters
            if let Some(page_str) = link
                .split("&page=")
                .nth(1)
                .or_else(|| link.split("?page=").nth(1))
                .and_then(|s| s.split(|c: char| c == '>' || c == '&').next())
            {
                return page_str.parse().ok();
            }
        }
    }
    None
}

/// Parse GitHub datetime format
fn parse_github_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VerifyError::parse(format!("GitHub datetime '{}': {}", s, e)))
}
