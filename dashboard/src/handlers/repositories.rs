// Top repositories page and JSON endpoints

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
};
use common::analysis::scalar_summaries;
use common::charts::{language_distribution_bar, repository_stats_bar};
use common::errors::ApiError;
use common::models::{Repository, ScalarSummary};
use common::source::{MAX_LIMIT, MIN_LIMIT};
use tera::Context;

use crate::handlers::params::RepositoryParams;
use crate::handlers::{setup_htmx_context, template_error, ErrorResponse, SuccessResponse};
use crate::state::AppState;
use crate::templates::TEMPLATES;

type Pairs = Query<Vec<(String, String)>>;

fn parse(pairs: &[(String, String)], state: &AppState) -> Result<RepositoryParams, ErrorResponse> {
    RepositoryParams::from_pairs(pairs, &state.config).map_err(|e| ApiError::from(e).into())
}

/// Top repositories page with language entry and count slider
#[tracing::instrument(skip(state, headers))]
pub async fn repositories_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Pairs,
) -> Result<Html<String>, ErrorResponse> {
    let params = parse(&pairs, &state)?;
    let repositories = state
        .source
        .most_starred(&params.language, params.limit)
        .await;

    let mut context = Context::new();
    context.insert("active_page", "repositories");
    context.insert("params", &params);
    context.insert("min_limit", &MIN_LIMIT);
    context.insert("max_limit", &MAX_LIMIT);
    context.insert("repositories", &repositories);

    if !repositories.is_empty() {
        let summary = scalar_summaries(&repositories);
        let charts = vec![
            repository_stats_bar(&repositories),
            language_distribution_bar(&summary.language_histogram),
        ];
        context.insert("summary", &summary);
        context.insert("charts", &charts);
    }

    let template = setup_htmx_context(
        &mut context,
        &headers,
        "_repositories_content.html",
        "repositories.html",
    );
    let html = TEMPLATES.render(template, &context).map_err(template_error)?;
    Ok(Html(html))
}

/// GET /api/repositories
#[tracing::instrument(skip(state))]
pub async fn list_repositories(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> Result<SuccessResponse<Vec<Repository>>, ErrorResponse> {
    let params = parse(&pairs, &state)?;
    let repositories = state
        .source
        .most_starred(&params.language, params.limit)
        .await;
    Ok(SuccessResponse::new(repositories))
}

/// GET /api/summary
#[tracing::instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> Result<SuccessResponse<ScalarSummary>, ErrorResponse> {
    let params = parse(&pairs, &state)?;
    let repositories = state
        .source
        .most_starred(&params.language, params.limit)
        .await;
    Ok(SuccessResponse::new(scalar_summaries(&repositories)))
}
