//! Navigation and filter endpoints
//!
//! The cursor moves within the filtered view but is stored as an absolute
//! index; every response carries the full cursor state so the client never
//! has to derive it.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::store::questions::image_filename;
use crate::AppState;
use abrank_common::db::{Annotation, Question};

/// Cursor state after a navigation or filter operation
#[derive(Debug, Serialize)]
pub struct CursorState {
    /// Absolute index into the unfiltered question list
    pub cursor: usize,
    /// 0-based position within the filtered view, absent if the filtered
    /// view is empty
    pub cursor_position: Option<usize>,
    pub total: usize,
    pub filtered_total: usize,
    pub filter: String,
    pub current: Option<CurrentQuestion>,
}

/// The question under the cursor, with its annotation if any
#[derive(Debug, Serialize)]
pub struct CurrentQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// Filename of a markdown image reference embedded in the question text
    pub image: Option<String>,
    pub annotation: Option<Annotation>,
}

pub fn cursor_state(session: &Session) -> CursorState {
    let cursor_position = session.cursor_position();

    // After reconciliation the cursor is only hidden when the filtered view
    // is empty; an empty view renders as an empty state, never as the
    // unreachable question the cursor still points at
    let current = cursor_position.and_then(|_| {
        session.current_question().map(|q| CurrentQuestion {
            question: q.clone(),
            image: image_filename(&q.question),
            annotation: session.annotations.get(q.id).cloned(),
        })
    });

    CursorState {
        cursor: session.cursor,
        cursor_position,
        total: session.questions.len(),
        filtered_total: session.filtered().len(),
        filter: session.filter.clone(),
        current,
    }
}

/// POST /api/nav/next
pub async fn nav_next(State(state): State<AppState>) -> Json<CursorState> {
    let mut session = state.session.write().await;
    session.step(1);
    Json(cursor_state(&session))
}

/// POST /api/nav/prev
pub async fn nav_prev(State(state): State<AppState>) -> Json<CursorState> {
    let mut session = state.session.write().await;
    session.step(-1);
    Json(cursor_state(&session))
}

/// Jump request: 1-based position within the filtered view
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub position: usize,
}

/// POST /api/nav/jump
///
/// Out-of-range positions are ignored (the response carries the unchanged
/// cursor state), not rejected.
pub async fn nav_jump(
    State(state): State<AppState>,
    Json(request): Json<JumpRequest>,
) -> Json<CursorState> {
    let mut session = state.session.write().await;
    session.jump(request.position);
    Json(cursor_state(&session))
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub filter: String,
}

/// PUT /api/filter
///
/// Sets the model-name filter and reconciles the cursor against the new
/// filtered view.
pub async fn set_filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Json<CursorState> {
    let mut session = state.session.write().await;
    session.set_filter(request.filter);
    Json(cursor_state(&session))
}
