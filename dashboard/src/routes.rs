use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Upstream fetches have their own timeout; leave headroom for analysis and rendering
    let request_timeout = Duration::from_secs(state.config.github.timeout_seconds + 15);

    // HTML pages (full layout, or the content partial for HTMX requests)
    let page_routes = Router::new()
        .route("/", get(handlers::pages::home))
        .route("/about", get(handlers::pages::about))
        .route("/repositories", get(handlers::repositories::repositories_page))
        .route("/analysis", get(handlers::analysis::analysis_page))
        .route("/users", get(handlers::users::user_lookup))
        .route("/users/:username", get(handlers::users::user_page));

    // JSON endpoints
    let api_routes = Router::new()
        .route("/api/repositories", get(handlers::repositories::list_repositories))
        .route("/api/summary", get(handlers::repositories::summary))
        .route("/api/analysis", get(handlers::analysis::analysis_api));

    let ops_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .merge(ops_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use common::config::Settings;
    use common::models::{Repository, UserProfile};
    use common::source::RepositorySource;
    use tower::ServiceExt;

    /// Serves a fixed set of repositories and one known user
    struct StubSource {
        repositories: Vec<Repository>,
    }

    #[async_trait]
    impl RepositorySource for StubSource {
        async fn most_starred(&self, _language: &str, limit: u32) -> Vec<Repository> {
            self.repositories.iter().take(limit as usize).cloned().collect()
        }

        async fn fetch_user(&self, username: &str) -> Option<UserProfile> {
            (username == "octocat").then(|| UserProfile {
                login: "octocat".to_string(),
                name: Some("The Octocat".to_string()),
                html_url: "https://github.com/octocat".to_string(),
                public_repos: 2,
                followers: 10,
                following: 1,
            })
        }

        async fn fetch_user_repositories(&self, username: &str, _per_page: u32) -> Vec<Repository> {
            if username == "octocat" {
                self.repositories.clone()
            } else {
                Vec::new()
            }
        }
    }

    fn repo(name: &str, stars: u64, forks: u64, language: &str, date: &str) -> Repository {
        Repository {
            name: name.to_string(),
            url: format!("https://github.com/acme/{}", name),
            description: None,
            stars,
            forks: Some(forks),
            watchers: stars,
            open_issues: 1,
            language: Some(language.to_string()),
            owner: Some("acme".to_string()),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        }
    }

    fn app(repositories: Vec<Repository>) -> Router {
        app_with(Settings::default(), repositories)
    }

    fn app_with(settings: Settings, repositories: Vec<Repository>) -> Router {
        let source: Arc<dyn RepositorySource> = Arc::new(StubSource { repositories });
        create_router(AppState::new(settings, source, None))
    }

    fn sample() -> Vec<Repository> {
        vec![
            repo("alpha", 300, 150, "Python", "2023-01-10"),
            repo("beta", 200, 100, "Python", "2023-05-02"),
            repo("gamma", 100, 60, "Rust", "2024-03-15"),
        ]
    }

    async fn get(app: Router, uri: &str, htmx: bool) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if htmx {
            request = request.header("HX-Request", "true");
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(Vec::new()), "/health", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (status, _) = get(app(Vec::new()), "/metrics", false).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_htmx_request_gets_partial() {
        let (status, full) = get(app(Vec::new()), "/", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(full.contains("<html"));

        let (status, partial) = get(app(Vec::new()), "/", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!partial.contains("<html"));
    }

    #[tokio::test]
    async fn test_api_repositories_respects_limit() {
        let (status, body) = get(app(sample()), "/api/repositories?language=python&limit=2", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "alpha");
    }

    #[tokio::test]
    async fn test_api_summary() {
        let (status, body) = get(app(sample()), "/api/summary", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["mean_stars"], 200.0);
        assert_eq!(json["data"]["total_forks"], 310);
        assert_eq!(json["data"]["modal_language"], "Python");
    }

    #[tokio::test]
    async fn test_invalid_limit_is_bad_request() {
        let (status, body) = get(app(sample()), "/api/repositories?limit=lots", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("validation_error"));
    }

    #[tokio::test]
    async fn test_api_analysis_regression() {
        let (status, body) = get(app(sample()), "/api/analysis?analysis=regression", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["rows"], 3);
        assert_eq!(json["data"]["outcome"]["type"], "regression");
        assert_eq!(json["data"]["outcome"]["result"]["samples"], 3);
    }

    #[tokio::test]
    async fn test_api_analysis_on_empty_data_is_unprocessable() {
        let (status, body) = get(app(Vec::new()), "/api/analysis?analysis=regression", false).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("analysis_error"));
    }

    #[tokio::test]
    async fn test_analysis_page_renders_selected_charts() {
        let (status, body) = get(
            app(sample()),
            "/analysis?analysis=yearly&viz=trend&viz=correlation",
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("chart-trend"));
        assert!(body.contains("Correlation Heatmap"));
    }

    #[tokio::test]
    async fn test_analysis_page_reports_failure_inline() {
        let (status, body) = get(app(Vec::new()), "/analysis?analysis=regression", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("alert-error"));
    }

    #[tokio::test]
    async fn test_unknown_visualization_is_bad_request() {
        let (status, _) = get(app(sample()), "/api/analysis?viz=pie", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_page() {
        let (status, body) = get(app(sample()), "/users/octocat", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("The Octocat"));
        assert!(body.contains("Python"));

        let (status, body) = get(app(sample()), "/users/nobody", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("not found"));
    }

    #[tokio::test]
    async fn test_export_then_analyze_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.data.csv_path = dir.path().join("exports").join("github_data.csv");

        let (status, body) = get(
            app_with(settings.clone(), sample()),
            "/api/analysis?analysis=yearly&export=true",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("exported_to"));
        assert!(settings.data.csv_path.exists());

        // The CSV source ignores the live data entirely
        let (status, body) = get(
            app_with(settings, Vec::new()),
            "/api/analysis?source=csv&analysis=quarterly",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["rows"], 3);
        let periods: Vec<&str> = json["data"]["outcome"]["buckets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["period"].as_str().unwrap())
            .collect();
        assert_eq!(periods, vec!["2023Q1", "2023Q2", "2024Q1"]);
    }

    #[tokio::test]
    async fn test_missing_csv_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.data.csv_path = dir.path().join("missing.csv");

        let (status, _) = get(app_with(settings, Vec::new()), "/api/analysis?source=csv", false).await;
        assert!(status.is_server_error());
    }

    #[tokio::test]
    async fn test_live_github_source_end_to_end() {
        use common::source::GitHubClient;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .and(query_param("q", "language:rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "name": "ripgrep",
                    "html_url": "https://github.com/BurntSushi/ripgrep",
                    "description": "fast grep",
                    "stargazers_count": 40000,
                    "forks_count": 1800,
                    "watchers_count": 40000,
                    "open_issues_count": 90,
                    "language": "Rust",
                    "owner": { "login": "BurntSushi" },
                    "created_at": "2016-03-11T02:02:33Z"
                }]
            })))
            .mount(&server)
            .await;

        let mut settings = Settings::default();
        settings.github.api_base_url = server.uri();
        let source: Arc<dyn RepositorySource> = Arc::new(GitHubClient::new(&settings.github).unwrap());
        let app = create_router(AppState::new(settings, source, None));

        let (status, body) = get(app, "/api/repositories?language=rust&limit=5", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"][0]["name"], "ripgrep");
        assert_eq!(json["data"][0]["stars"], 40000);
        assert_eq!(json["data"][0]["date"], "2016-03-11");
    }

    #[tokio::test]
    async fn test_export_keeps_previous_file_when_nothing_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.data.csv_path = dir.path().join("github_data.csv");
        let line_count = |path: &std::path::Path| std::fs::read_to_string(path).unwrap().lines().count();

        let (status, _) = get(
            app_with(settings.clone(), sample()),
            "/api/analysis?analysis=volatility&export=true",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line_count(&settings.data.csv_path), 4);

        // Upstream came back empty
        let (status, body) = get(
            app_with(settings.clone(), Vec::new()),
            "/api/analysis?analysis=volatility&export=true",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["data"]["exported_to"].is_null());
        assert!(json["data"]["export_skipped"].is_string());
        assert_eq!(line_count(&settings.data.csv_path), 4);

        // Exporting a table read from the same file is refused too
        let (status, body) = get(
            app_with(settings.clone(), Vec::new()),
            "/api/analysis?source=csv&analysis=volatility&export=true",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["rows"], 3);
        assert!(json["data"]["export_skipped"].is_string());
        assert_eq!(line_count(&settings.data.csv_path), 4);
    }

    #[tokio::test]
    async fn test_chart_data_cannot_break_out_of_script() {
        let hostile = repo(
            "</script><script>alert(1)</script>",
            500,
            10,
            "Rust",
            "2023-02-01",
        );
        let (status, body) = get(
            app(vec![hostile]),
            "/analysis?analysis=volatility&viz=repository_stats",
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("renderChart("));
        assert!(!body.contains("<script>alert(1)"));
        assert!(body.contains("\\u003c/script\\u003e"));
    }

    #[tokio::test]
    async fn test_malformed_username_is_bad_request() {
        let (status, body) = get(app(sample()), "/users/octocat%2Frepos", true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("validation_error"));

        let (status, _) = get(app(sample()), "/users?username=..", true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
