//! Annotation endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::ApiError;
use crate::store::annotations::AnnotationStats;
use crate::AppState;
use abrank_common::db::{Annotation, AnnotationLabel};

/// GET /api/annotations
///
/// The full in-memory annotation map for the current identity.
pub async fn list_annotations(
    State(state): State<AppState>,
) -> Json<BTreeMap<i64, Annotation>> {
    let session = state.session.read().await;
    Json(session.annotations.all().clone())
}

#[derive(Debug, Deserialize)]
pub struct PutAnnotationRequest {
    pub answer: AnnotationLabel,
    #[serde(default)]
    pub comments: Option<String>,
}

/// PUT /api/annotations/:question_id
///
/// Upserts the annotation for one question. The in-memory map is updated
/// unconditionally; backend persistence is best-effort and never fails the
/// request.
pub async fn put_annotation(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(request): Json<PutAnnotationRequest>,
) -> Result<Json<Annotation>, ApiError> {
    let mut session = state.session.write().await;

    if !session.questions.contains_id(question_id) {
        return Err(ApiError::NotFound(format!(
            "Unknown question id {}",
            question_id
        )));
    }

    let record = session
        .annotations
        .put(question_id, request.answer, request.comments)
        .await;

    Ok(Json(record))
}

/// GET /api/annotations/statistics
pub async fn annotation_statistics(State(state): State<AppState>) -> Json<AnnotationStats> {
    let session = state.session.read().await;
    Json(session.annotations.statistics())
}
