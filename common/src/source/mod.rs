// Repository data sources
// Provides the trait the dashboard depends on and the GitHub implementation

pub mod github;

use crate::models::{Repository, UserProfile};
use async_trait::async_trait;

pub use github::GitHubClient;

/// Lowest and highest accepted result-count limit
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

/// Clamp a requested result count into the accepted range
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Longest login GitHub accepts
pub const MAX_USERNAME_LEN: usize = 39;

/// Whether `username` is shaped like a GitHub login: ASCII alphanumerics and
/// single inner hyphens, at most [`MAX_USERNAME_LEN`] characters
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--")
}

/// RepositorySource defines the degrading fetch interface
///
/// Every method swallows upstream failures: errors are logged and the caller
/// receives an empty result.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Most starred repositories for a language, best first
    async fn most_starred(&self, language: &str, limit: u32) -> Vec<Repository>;

    /// Public profile of a user, or `None` if it could not be fetched
    async fn fetch_user(&self, username: &str) -> Option<UserProfile>;

    /// Repositories owned by a user
    async fn fetch_user_repositories(&self, username: &str, per_page: u32) -> Vec<Repository>;

    /// Language usage across a user's repositories, most used first
    async fn most_used_languages(&self, username: &str) -> Vec<(String, usize)> {
        let repositories = self.fetch_user_repositories(username, MAX_LIMIT).await;
        let mut histogram = crate::analysis::language_histogram(&repositories);
        // Stable sort keeps first-seen order among equal counts
        histogram.sort_by(|a, b| b.1.cmp(&a.1));
        histogram
    }
}
