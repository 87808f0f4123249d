//! abrank-ui library - annotation web service
//!
//! Serves a static single-page UI plus the JSON API for browsing a question
//! set, recording pairwise answer judgments, and exporting the results.

use abrank_common::config::StoragePaths;
use abrank_common::Result;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cursor;
pub mod export;
pub mod session;
pub mod store;

use session::Session;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (users and signed-in annotations)
    pub db: SqlitePool,
    /// Well-known data file locations under the root folder
    pub paths: Arc<StoragePaths>,
    /// The single annotation session this process serves
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create application state, loading the question set and the anonymous
    /// annotation map. Fails if the question source is missing or malformed.
    pub async fn new(db: SqlitePool, paths: StoragePaths) -> Result<Self> {
        let session = Session::open_anonymous(&paths).await?;
        Ok(Self {
            db,
            paths: Arc::new(paths),
            session: Arc::new(RwLock::new(session)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .route("/api/questions", get(api::list_questions).post(api::create_question))
        .route("/api/annotations", get(api::list_annotations))
        .route("/api/annotations/statistics", get(api::annotation_statistics))
        .route("/api/annotations/:question_id", put(api::put_annotation))
        .route("/api/nav/next", post(api::nav_next))
        .route("/api/nav/prev", post(api::nav_prev))
        .route("/api/nav/jump", post(api::nav_jump))
        .route("/api/filter", put(api::set_filter))
        .route("/api/session", get(api::get_session))
        .route("/api/session/login", post(api::login))
        .route("/api/session/logout", post(api::logout))
        .route("/api/export/json", get(api::export_json))
        .route("/api/export/csv", get(api::export_csv))
        .route("/api/export/markdown", get(api::export_markdown))
        .route("/api/export/share", post(api::share_export))
        .route("/preview/:key", get(api::serve_preview))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
