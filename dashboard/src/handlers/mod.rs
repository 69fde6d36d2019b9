pub mod analysis;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod params;
pub mod repositories;
pub mod users;

// Common response types
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::errors::ApiError;
use serde::Serialize;
use tera::Context;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "analysis_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "fetch_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: err.code.to_lowercase(),
            message: err.message,
            details: err.details,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self.error, message = %self.message, trace_id = %self.trace_id, "Request failed");
        }
        (self.status(), Json(self)).into_response()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Check if request is HTMX and pick the template accordingly
///
/// HTMX requests get only the content partial, full page loads the layout.
pub fn setup_htmx_context(
    context: &mut Context,
    headers: &HeaderMap,
    content_template: &'static str,
    full_template: &'static str,
) -> &'static str {
    let is_htmx = headers.get("HX-Request").is_some();
    context.insert("is_htmx", &is_htmx);

    if is_htmx {
        content_template
    } else {
        full_template
    }
}

pub fn template_error(e: impl std::fmt::Display) -> ErrorResponse {
    ErrorResponse::new("template_error", format!("Template error: {}", e))
}
