// Analysis page and JSON endpoint
// Loads a table (live fetch or CSV), runs the selected analysis and builds the selected charts

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
};
use common::analysis::{correlation_matrix, fit_linear, run_analysis, scalar_summaries};
use common::charts::{self, ChartSpec, DEFAULT_HISTOGRAM_BINS};
use common::errors::{AnalysisError, ApiError};
use common::models::{AnalysisKind, AnalysisOutcome, DataSource, Period, Visualization};
use common::source::{MAX_LIMIT, MIN_LIMIT};
use common::table::RepositoryTable;
use serde::Serialize;
use tera::Context;

use crate::handlers::params::AnalysisParams;
use crate::handlers::{setup_htmx_context, template_error, ErrorResponse, SuccessResponse};
use crate::state::AppState;
use crate::templates::TEMPLATES;

/// Everything the analysis view renders
#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub rows: usize,
    pub outcome: Option<AnalysisOutcome>,
    pub error: Option<String>,
    pub charts: Vec<ChartSpec>,
    pub exported_to: Option<String>,
    pub export_skipped: Option<String>,
    #[serde(skip)]
    pub failure: Option<AnalysisError>,
}

/// Load the table the sidebar points at
async fn load_table(state: &AppState, params: &AnalysisParams) -> Result<RepositoryTable, ErrorResponse> {
    match params.source {
        DataSource::Live => {
            let records = state
                .source
                .most_starred(&params.repositories.language, params.repositories.limit)
                .await;
            Ok(RepositoryTable::from_records(&records))
        }
        DataSource::Csv => {
            RepositoryTable::read_csv(&state.config.data.csv_path).map_err(|e| ApiError::from(e).into())
        }
    }
}

fn build_chart(
    viz: Visualization,
    table: &RepositoryTable,
    state: &AppState,
) -> Result<ChartSpec, AnalysisError> {
    let chart = match viz {
        Visualization::RepositoryStats => charts::repository_stats_bar(&table.records()),
        Visualization::LanguageDistribution => {
            let summary = scalar_summaries(&table.records());
            charts::language_distribution_bar(&summary.language_histogram)
        }
        Visualization::StarsVsForks => {
            // A degenerate fit still plots the points
            let fit = fit_linear(table).ok();
            charts::stars_forks_scatter(table, fit.as_ref())
        }
        Visualization::Trend => {
            let buckets =
                common::analysis::bucket_by_period(table, Period::Year, state.config.data.date_policy)?;
            charts::trend_line(&buckets, "Yearly Mean Stars and Forks")
        }
        Visualization::Correlation => charts::correlation_heatmap(&correlation_matrix(table)),
        Visualization::StarsHistogram => charts::stars_histogram(table, DEFAULT_HISTOGRAM_BINS),
    };
    Ok(chart)
}

/// Why exporting `table` would lose data, if it would
fn export_blocker(params: &AnalysisParams, table: &RepositoryTable) -> Option<&'static str> {
    if params.source == DataSource::Csv {
        Some("table was loaded from the export file itself")
    } else if table.is_empty() {
        Some("no repositories loaded; keeping the previous export")
    } else {
        None
    }
}

/// Run the selected analysis; analysis failures are reported in the view
pub fn compute(
    state: &AppState,
    params: &AnalysisParams,
    table: &RepositoryTable,
) -> Result<AnalysisView, ErrorResponse> {
    let path = &state.config.data.csv_path;
    let (exported_to, export_skipped) = if !params.export {
        (None, None)
    } else if let Some(reason) = export_blocker(params, table) {
        tracing::warn!(path = %path.display(), reason = reason, "CSV export skipped");
        (None, Some(reason.to_string()))
    } else {
        table.write_csv(path).map_err(|e| ErrorResponse::from(ApiError::from(e)))?;
        (Some(path.display().to_string()), None)
    };

    let mut errors = Vec::new();
    let (outcome, failure) = match run_analysis(params.analysis, table, state.config.data.date_policy) {
        Ok(outcome) => (Some(outcome), None),
        Err(e) => {
            errors.push(e.to_string());
            (None, Some(e))
        }
    };

    let mut charts = Vec::new();
    for viz in &params.visualizations {
        match build_chart(*viz, table, state) {
            Ok(chart) => charts.push(chart),
            Err(e) => errors.push(format!("{}: {}", viz.label(), e)),
        }
    }

    tracing::info!(
        analysis = params.analysis.as_str(),
        rows = table.len(),
        charts = charts.len(),
        failed = !errors.is_empty(),
        "Analysis computed"
    );

    Ok(AnalysisView {
        rows: table.len(),
        outcome,
        error: (!errors.is_empty()).then(|| errors.join("; ")),
        charts,
        exported_to,
        export_skipped,
        failure,
    })
}

/// Analysis page with sidebar selectors
#[tracing::instrument(skip(state, headers))]
pub async fn analysis_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, ErrorResponse> {
    let params = AnalysisParams::from_pairs(&pairs, &state.config)
        .map_err(|e| ErrorResponse::from(ApiError::from(e)))?;
    let table = load_table(&state, &params).await?;
    let view = compute(&state, &params, &table)?;

    let analyses: Vec<(&str, &str)> = AnalysisKind::ALL
        .iter()
        .map(|a| (a.as_str(), a.label()))
        .collect();
    let visualizations: Vec<(&str, &str)> = Visualization::ALL
        .iter()
        .map(|v| (v.as_str(), v.label()))
        .collect();
    let selected_viz: Vec<&str> = params.visualizations.iter().map(|v| v.as_str()).collect();

    let mut context = Context::new();
    context.insert("active_page", "analysis");
    context.insert("params", &params);
    context.insert("selected_analysis", params.analysis.as_str());
    context.insert("analysis_label", params.analysis.label());
    context.insert("analyses", &analyses);
    context.insert("visualizations", &visualizations);
    context.insert("selected_viz", &selected_viz);
    context.insert("min_limit", &MIN_LIMIT);
    context.insert("max_limit", &MAX_LIMIT);
    context.insert("charts", &view.charts);
    context.insert("view", &view);

    let template = setup_htmx_context(&mut context, &headers, "_analysis_content.html", "analysis.html");
    let html = TEMPLATES.render(template, &context).map_err(template_error)?;
    Ok(Html(html))
}

/// GET /api/analysis
///
/// Unlike the page, an analysis failure is a 422 here.
#[tracing::instrument(skip(state))]
pub async fn analysis_api(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<SuccessResponse<AnalysisView>, ErrorResponse> {
    let params = AnalysisParams::from_pairs(&pairs, &state.config)
        .map_err(|e| ErrorResponse::from(ApiError::from(e)))?;
    let table = load_table(&state, &params).await?;
    let mut view = compute(&state, &params, &table)?;
    if let Some(failure) = view.failure.take() {
        return Err(ApiError::from(failure).into());
    }
    Ok(SuccessResponse::new(view))
}
