use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

mod handlers;
mod routes;
mod state;
mod templates;

use common::config::Settings;
use common::source::{GitHubClient, RepositorySource};
use common::telemetry;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Settings::load()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(&config.observability.log_level, config.observability.json_logs)?;
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        api = %config.github.api_base_url,
        csv = %config.data.csv_path.display(),
        "Configuration loaded"
    );

    // Initialize Prometheus metrics exporter
    let metrics_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    telemetry::describe_metrics();
    tracing::info!("Metrics recorder installed");

    let client = GitHubClient::new(&config.github)?;
    tracing::info!(base_url = %client.base_url(), "GitHub client initialized");
    let source: Arc<dyn RepositorySource> = Arc::new(client);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let state = AppState::new(config, source, Some(metrics_handle));
    let app = routes::create_router(state);

    tracing::info!(addr = %addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dashboard stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
