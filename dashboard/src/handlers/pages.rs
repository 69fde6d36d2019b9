// Static navigation pages

use axum::{extract::State, http::HeaderMap, response::Html};
use common::models::{AnalysisKind, Visualization};
use tera::Context;

use crate::handlers::{setup_htmx_context, template_error, ErrorResponse};
use crate::state::AppState;
use crate::templates::TEMPLATES;

/// Home page
#[tracing::instrument(skip(state, headers))]
pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, ErrorResponse> {
    let mut context = Context::new();
    context.insert("active_page", "home");
    context.insert("default_language", &state.config.github.default_language);
    context.insert("default_limit", &state.config.github.default_limit);

    let analyses: Vec<&str> = AnalysisKind::ALL.iter().map(|a| a.label()).collect();
    let charts: Vec<&str> = Visualization::ALL.iter().map(|v| v.label()).collect();
    context.insert("analyses", &analyses);
    context.insert("charts", &charts);

    let template = setup_htmx_context(&mut context, &headers, "_home_content.html", "home.html");
    let html = TEMPLATES.render(template, &context).map_err(template_error)?;
    Ok(Html(html))
}

/// About page
#[tracing::instrument(skip(headers))]
pub async fn about(headers: HeaderMap) -> Result<Html<String>, ErrorResponse> {
    let mut context = Context::new();
    context.insert("active_page", "about");
    context.insert("version", env!("CARGO_PKG_VERSION"));

    let template = setup_htmx_context(&mut context, &headers, "_about_content.html", "about.html");
    let html = TEMPLATES.render(template, &context).map_err(template_error)?;
    Ok(Html(html))
}
