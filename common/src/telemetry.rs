// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence over the configured level. With `json` set the
/// output is one JSON object per line including span context, otherwise a
/// compact human-readable format is used.
pub fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, json = json, "Logging initialized");

    Ok(())
}

/// Register descriptions for every metric this crate emits
///
/// Call once after a recorder has been installed.
pub fn describe_metrics() {
    describe_counter!(
        "github_fetch_success_total",
        "Total number of successful GitHub API requests"
    );
    describe_counter!(
        "github_fetch_failed_total",
        "Total number of failed GitHub API requests"
    );
    describe_histogram!(
        "github_fetch_duration_seconds",
        "Duration of GitHub API requests in seconds"
    );
    describe_histogram!(
        "analysis_duration_seconds",
        "Duration of analysis computations in seconds"
    );
}

#[inline]
pub fn record_fetch_success(endpoint: &str, duration_seconds: f64) {
    counter!("github_fetch_success_total", "endpoint" => endpoint.to_string()).increment(1);
    histogram!("github_fetch_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration_seconds);
}

#[inline]
pub fn record_fetch_failure(endpoint: &str, reason: &str) {
    counter!(
        "github_fetch_failed_total",
        "endpoint" => endpoint.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

#[inline]
pub fn record_analysis_duration(analysis: &str, duration_seconds: f64) {
    histogram!("analysis_duration_seconds", "analysis" => analysis.to_string())
        .record(duration_seconds);
}
