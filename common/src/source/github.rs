// GitHub REST API repository source

use crate::config::GitHubConfig;
use crate::errors::FetchError;
use crate::models::{Repository, UserProfile};
use crate::source::{clamp_limit, is_valid_username, RepositorySource};
use crate::table::parse_date;
use crate::telemetry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Search endpoint payload; only `items` is read
#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<RepositoryItem>,
}

#[derive(Debug, Deserialize)]
struct RepositoryItem {
    name: String,
    html_url: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    forks_count: Option<u64>,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    language: Option<String>,
    created_at: Option<String>,
    owner: Option<OwnerItem>,
}

#[derive(Debug, Deserialize)]
struct OwnerItem {
    login: String,
}

impl From<RepositoryItem> for Repository {
    fn from(item: RepositoryItem) -> Self {
        Repository {
            name: item.name,
            url: item.html_url,
            description: item.description,
            stars: item.stargazers_count,
            forks: item.forks_count,
            watchers: item.watchers_count,
            open_issues: item.open_issues_count,
            language: item.language,
            owner: item.owner.map(|o| o.login),
            date: item.created_at.as_deref().and_then(parse_date),
        }
    }
}

/// GitHubClient issues one unauthenticated GET per call
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHubClient from configuration
    pub fn new(config: &GitHubConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|e| FetchError::ClientBuild(format!("Invalid Accept header: {}", e)))?;
        headers.insert(ACCEPT, accept);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document and decode it
    #[tracing::instrument(skip(self, query))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "Sending GitHub API request");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Search the most starred repositories written in `language`
    #[tracing::instrument(skip(self))]
    pub async fn search_top_starred(
        &self,
        language: &str,
        limit: u32,
    ) -> Result<Vec<Repository>, FetchError> {
        let query = [
            ("q", format!("language:{}", language.trim())),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", clamp_limit(limit).to_string()),
        ];
        let response: SearchResponse = self.get_json(&["search", "repositories"], &query).await?;
        Ok(response.items.into_iter().map(Repository::from).collect())
    }

    /// Fetch the public profile of `username`
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, FetchError> {
        let username = checked_username(username)?;
        self.get_json(&["users", username], &[]).await
    }

    /// List repositories owned by `username`
    #[tracing::instrument(skip(self))]
    pub async fn list_user_repositories(
        &self,
        username: &str,
        per_page: u32,
    ) -> Result<Vec<Repository>, FetchError> {
        let username = checked_username(username)?;
        let query = [("per_page", clamp_limit(per_page).to_string())];
        let items: Vec<RepositoryItem> = self
            .get_json(&["users", username, "repos"], &query)
            .await?;
        Ok(items.into_iter().map(Repository::from).collect())
    }
}

fn checked_username(username: &str) -> Result<&str, FetchError> {
    let username = username.trim();
    if is_valid_username(username) {
        Ok(username)
    } else {
        Err(FetchError::InvalidUsername(username.to_string()))
    }
}

/// Log and count a fetch outcome, collapsing failures to `None`
fn observe<T>(endpoint: &str, started: Instant, result: Result<T, FetchError>) -> Option<T> {
    match result {
        Ok(value) => {
            telemetry::record_fetch_success(endpoint, started.elapsed().as_secs_f64());
            Some(value)
        }
        Err(e) => {
            tracing::warn!(endpoint = endpoint, error = %e, "GitHub request failed");
            telemetry::record_fetch_failure(endpoint, e.reason());
            None
        }
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn most_starred(&self, language: &str, limit: u32) -> Vec<Repository> {
        let started = Instant::now();
        let result = self.search_top_starred(language, limit).await;
        let repositories = observe("search", started, result).unwrap_or_default();
        tracing::info!(
            language = language,
            limit = limit,
            count = repositories.len(),
            "Fetched most starred repositories"
        );
        repositories
    }

    async fn fetch_user(&self, username: &str) -> Option<UserProfile> {
        let started = Instant::now();
        let result = self.get_user(username).await;
        observe("user", started, result)
    }

    async fn fetch_user_repositories(&self, username: &str, per_page: u32) -> Vec<Repository> {
        let started = Instant::now();
        let result = self.list_user_repositories(username, per_page).await;
        observe("user_repos", started, result).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_conversion_reads_created_at_date() {
        let item: RepositoryItem = serde_json::from_value(serde_json::json!({
            "name": "cpython",
            "html_url": "https://github.com/python/cpython",
            "description": null,
            "stargazers_count": 60000,
            "forks_count": 30000,
            "watchers_count": 60000,
            "open_issues_count": 9000,
            "language": "Python",
            "created_at": "2017-02-10T19:23:51Z",
            "owner": { "login": "python" }
        }))
        .unwrap();

        let repo = Repository::from(item);
        assert_eq!(repo.stars, 60000);
        assert_eq!(repo.forks, Some(30000));
        assert_eq!(repo.owner.as_deref(), Some("python"));
        assert_eq!(repo.date, chrono::NaiveDate::from_ymd_opt(2017, 2, 10));
        assert!(repo.description.is_none());
    }

    #[test]
    fn test_item_without_optional_fields() {
        let item: RepositoryItem = serde_json::from_value(serde_json::json!({
            "name": "bare",
            "html_url": "https://github.com/x/bare"
        }))
        .unwrap();

        let repo = Repository::from(item);
        assert_eq!(repo.stars, 0);
        assert!(repo.forks.is_none());
        assert!(repo.language.is_none());
        assert!(repo.date.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let mut config = crate::config::Settings::default().github;
        config.api_base_url = "http://localhost:1234/".to_string();
        let client = GitHubClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let mut config = crate::config::Settings::default().github;
        config.api_base_url = "http://localhost:1234/api/v3/".to_string();
        let client = GitHubClient::new(&config).unwrap();

        let url = client.endpoint(&["users", "octocat/repos"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1234/api/v3/users/octocat%2Frepos");

        let url = client.endpoint(&["search", "repositories"]).unwrap();
        assert_eq!(url.path(), "/api/v3/search/repositories");
    }

    #[test]
    fn test_checked_username_rejects_path_tricks() {
        assert_eq!(checked_username(" octocat ").unwrap(), "octocat");
        for bad in ["octocat/repos", "../search/repositories?q=x", "..", ""] {
            assert!(matches!(
                checked_username(bad),
                Err(FetchError::InvalidUsername(_))
            ));
        }
    }
}
