//! Database models and queries for users and annotations

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One unit of comparison work: a prompt and two candidate answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer_a: String,
    pub answer_b: String,
    pub model_name: String,
}

/// User-submitted question, before an id is assigned
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub answer_a: String,
    pub answer_b: String,
    pub model_name: String,
}

/// Fixed label set for a judgment on one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLabel {
    BothCorrect,
    ABetter,
    BBetter,
    NotSure,
}

impl AnnotationLabel {
    /// Stable text form, used for database storage and CSV export
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationLabel::BothCorrect => "both_correct",
            AnnotationLabel::ABetter => "a_better",
            AnnotationLabel::BBetter => "b_better",
            AnnotationLabel::NotSure => "not_sure",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "both_correct" => Ok(AnnotationLabel::BothCorrect),
            "a_better" => Ok(AnnotationLabel::ABetter),
            "b_better" => Ok(AnnotationLabel::BBetter),
            "not_sure" => Ok(AnnotationLabel::NotSure),
            other => Err(Error::InvalidInput(format!(
                "Unknown annotation label: {}",
                other
            ))),
        }
    }
}

/// A user's recorded judgment for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub answer: AnnotationLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// RFC 3339 time of the last write
    pub timestamp: String,
}

/// Registered user (signed-in identity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub created_at: String,
}

/// Look up a user by username, creating the row on first login
pub async fn find_or_create_user(pool: &SqlitePool, username: &str) -> Result<User> {
    if let Some(user) = sqlx::query_as::<_, (String, String, String)>(
        "SELECT guid, username, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    {
        return Ok(User {
            guid: user.0,
            username: user.1,
            created_at: user.2,
        });
    }

    let guid = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO users (guid, username) VALUES (?, ?)")
        .bind(&guid)
        .bind(username)
        .execute(pool)
        .await?;

    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT guid, username, created_at FROM users WHERE guid = ?",
    )
    .bind(&guid)
    .fetch_one(pool)
    .await?;

    Ok(User {
        guid: row.0,
        username: row.1,
        created_at: row.2,
    })
}

/// Load all annotations for one user, ordered by question id
pub async fn load_annotations(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<BTreeMap<i64, Annotation>> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, String)>(
        "SELECT question_id, answer, comments, timestamp
         FROM annotations
         WHERE user_id = ?
         ORDER BY question_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut map = BTreeMap::new();
    for (question_id, answer, comments, timestamp) in rows {
        map.insert(
            question_id,
            Annotation {
                answer: AnnotationLabel::parse(&answer)?,
                comments,
                timestamp,
            },
        );
    }

    Ok(map)
}

/// Insert or overwrite one annotation row (last-write-wins, no versioning)
pub async fn upsert_annotation(
    pool: &SqlitePool,
    user_id: &str,
    question_id: i64,
    annotation: &Annotation,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO annotations (user_id, question_id, answer, comments, timestamp)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (user_id, question_id) DO UPDATE SET
             answer = excluded.answer,
             comments = excluded.comments,
             timestamp = excluded.timestamp",
    )
    .bind(user_id)
    .bind(question_id)
    .bind(annotation.answer.as_str())
    .bind(&annotation.comments)
    .bind(&annotation.timestamp)
    .execute(pool)
    .await?;

    Ok(())
}
