// User profile page
// Shows a user's public profile and the languages across their repositories

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Html,
};
use common::charts::language_distribution_bar;
use common::errors::{ApiError, ValidationError};
use common::source::is_valid_username;
use serde::Deserialize;
use tera::Context;

use crate::handlers::{setup_htmx_context, template_error, ErrorResponse};
use crate::state::AppState;
use crate::templates::TEMPLATES;

#[derive(Debug, Deserialize)]
pub struct UserLookup {
    #[serde(default)]
    pub username: String,
}

/// GET /users/:username
#[tracing::instrument(skip(state, headers))]
pub async fn user_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Html<String>, ErrorResponse> {
    render_user(&state, &headers, &username).await
}

/// GET /users?username=...
///
/// Backs the lookup form, which cannot build the path itself.
#[tracing::instrument(skip(state, headers))]
pub async fn user_lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(lookup): Query<UserLookup>,
) -> Result<Html<String>, ErrorResponse> {
    render_user(&state, &headers, &lookup.username).await
}

async fn render_user(
    state: &AppState,
    headers: &HeaderMap,
    username: &str,
) -> Result<Html<String>, ErrorResponse> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::from(ValidationError::MissingField("username".to_string())).into());
    }
    if !is_valid_username(username) {
        return Err(ApiError::from(ValidationError::InvalidFieldValue {
            field: "username".to_string(),
            reason: "expected a GitHub login (letters, digits and single hyphens)".to_string(),
        })
        .into());
    }

    let mut context = Context::new();
    context.insert("active_page", "users");
    context.insert("username", username);

    // An unknown user renders the page with a notice, not an error status
    match state.source.fetch_user(username).await {
        Some(profile) => {
            let languages = state.source.most_used_languages(username).await;
            tracing::debug!(user = %profile.login, languages = languages.len(), "User profile loaded");
            if !languages.is_empty() {
                context.insert("charts", &vec![language_distribution_bar(&languages)]);
            }
            context.insert("profile", &profile);
            context.insert("languages", &languages);
        }
        None => {
            tracing::info!(user = %username, "User not found");
        }
    }

    let template = setup_htmx_context(&mut context, headers, "_user_content.html", "user.html");
    let html = TEMPLATES.render(template, &context).map_err(template_error)?;
    Ok(Html(html))
}
