//! Shareable snapshot retrieval

use axum::{
    extract::{Path, State},
    response::Html,
};

use super::ApiError;
use crate::AppState;

/// GET /preview/:key
///
/// Serves a stored HTML snapshot. Keys are restricted to alphanumerics and
/// underscores so a crafted key cannot escape the previews directory.
pub async fn serve_preview(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, ApiError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ApiError::BadRequest("Invalid preview key".to_string()));
    }

    let file = state.paths.previews_dir().join(format!("{}.html", key));
    match std::fs::read_to_string(&file) {
        Ok(html) => Ok(Html(html)),
        Err(_) => Err(ApiError::NotFound(format!("No preview under key {}", key))),
    }
}
