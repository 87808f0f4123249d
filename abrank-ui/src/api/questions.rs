//! Question listing and creation endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::nav::{cursor_state, CursorState};
use super::ApiError;
use crate::store::questions::image_filename;
use crate::AppState;
use abrank_common::db::{Question, QuestionDraft};

/// One row of the filtered question list
#[derive(Debug, Serialize)]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: Question,
    pub image: Option<String>,
    pub annotated: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionListResponse {
    #[serde(flatten)]
    pub cursor: CursorState,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

/// GET /api/questions?filter=
///
/// Returns the filtered question list along with the cursor state. A
/// supplied `filter` parameter replaces the session filter (with cursor
/// reconciliation) before the response is built.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<QuestionListResponse> {
    let mut session = state.session.write().await;

    if let Some(filter) = query.filter {
        session.set_filter(filter);
    }

    let questions = session
        .filtered()
        .into_iter()
        .map(|q| QuestionView {
            question: q.clone(),
            image: image_filename(&q.question),
            annotated: session.annotations.get(q.id).is_some(),
        })
        .collect();

    Json(QuestionListResponse {
        cursor: cursor_state(&session),
        questions,
    })
}

/// POST /api/questions
///
/// Creates a locally-stored question with a synthesized negative id.
/// All four text fields must be non-empty.
pub async fn create_question(
    State(state): State<AppState>,
    Json(draft): Json<QuestionDraft>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    for (field, value) in [
        ("question", &draft.question),
        ("answer_a", &draft.answer_a),
        ("answer_b", &draft.answer_b),
        ("model_name", &draft.model_name),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Field '{}' must not be empty",
                field
            )));
        }
    }

    let mut session = state.session.write().await;
    let question = session.add_question(draft)?;

    Ok((StatusCode::CREATED, Json(question)))
}
