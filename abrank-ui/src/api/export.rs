//! Export endpoints
//!
//! All exports cover the current filtered view restricted to annotated
//! questions. The share variant writes an HTML snapshot under a random key
//! and returns its preview path.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::ApiError;
use crate::export;
use crate::AppState;

/// GET /api/export/json
pub async fn export_json(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    let filtered = session.filtered();
    let entries = export::restrict(&filtered, session.annotations.all());
    let body = export::to_json(&entries);
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// GET /api/export/csv
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    let filtered = session.filtered();
    let entries = export::restrict(&filtered, session.annotations.all());
    let body = export::to_csv(&entries);
    ([(header::CONTENT_TYPE, "text/csv")], body).into_response()
}

/// GET /api/export/markdown
pub async fn export_markdown(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    let filtered = session.filtered();
    let entries = export::restrict(&filtered, session.annotations.all());
    let body = export::to_markdown(&entries);
    ([(header::CONTENT_TYPE, "text/markdown")], body).into_response()
}

/// POST /api/export/share
///
/// Materializes the markdown export as a static HTML snapshot and returns
/// `{"path": "/preview/<key>"}`.
pub async fn share_export(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session.read().await;
    let filtered = session.filtered();
    let entries = export::restrict(&filtered, session.annotations.all());
    let html = export::shareable_html(&export::to_markdown(&entries));

    let path = export::store_snapshot(&state.paths, &html)?;

    Ok(Json(json!({ "path": path })))
}
