use std::sync::Arc;

use common::config::Settings;
use common::source::RepositorySource;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub source: Arc<dyn RepositorySource>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(
        config: Settings,
        source: Arc<dyn RepositorySource>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            metrics,
        }
    }
}
