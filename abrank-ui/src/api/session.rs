//! Session identity endpoints
//!
//! Identity selects the annotation backend: signed-in sessions use per-user
//! database rows, anonymous sessions use the local JSON document. Switching
//! identity reloads the annotation map from the newly-selected backend;
//! nothing is merged across the transition.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;
use abrank_common::db::{find_or_create_user, User};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
    /// Active annotation backend: "remote" (database) or "local" (file)
    pub backend: &'static str,
}

fn session_response(user: Option<User>) -> SessionResponse {
    let backend = if user.is_some() { "remote" } else { "local" };
    SessionResponse { user, backend }
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.read().await;
    Json(session_response(session.user.clone()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// POST /api/session/login
///
/// Creates the user row on first login, then switches the annotation
/// backend to the user's database rows.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username must not be empty".to_string()));
    }

    let user = find_or_create_user(&state.db, username).await?;

    let mut session = state.session.write().await;
    session.sign_in(&state.db, user).await;

    Ok(Json(session_response(session.user.clone())))
}

/// POST /api/session/logout
///
/// Returns to the anonymous backend and reloads the local annotation map.
pub async fn logout(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.write().await;
    session.sign_out(&state.paths).await;
    Json(session_response(None))
}
