//! HTTP API handlers for abrank-ui

pub mod annotations;
pub mod export;
pub mod health;
pub mod nav;
pub mod preview;
pub mod questions;
pub mod session;
pub mod ui;

pub use annotations::{annotation_statistics, list_annotations, put_annotation};
pub use export::{export_csv, export_json, export_markdown, share_export};
pub use health::health_routes;
pub use nav::{nav_jump, nav_next, nav_prev, set_filter};
pub use preview::serve_preview;
pub use questions::{create_question, list_questions};
pub use session::{get_session, login, logout};
pub use ui::{serve_app_js, serve_index};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API errors mapped to HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<abrank_common::Error> for ApiError {
    fn from(e: abrank_common::Error) -> Self {
        use abrank_common::Error;
        match e {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
