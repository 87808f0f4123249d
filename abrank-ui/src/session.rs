//! Annotation session state
//!
//! One session owns the question store, the annotation store for the
//! current identity, and the filter/cursor position. Identity changes swap
//! the annotation backend and reload from it; anonymous annotations are not
//! merged into the signed-in store.

use crate::cursor;
use crate::store::{
    AnnotationStore, JsonFileAnnotationRepository, QuestionStore, SqliteAnnotationRepository,
};
use abrank_common::config::StoragePaths;
use abrank_common::db::{Question, QuestionDraft, User};
use abrank_common::Result;
use sqlx::SqlitePool;

pub struct Session {
    pub questions: QuestionStore,
    pub annotations: AnnotationStore,
    pub user: Option<User>,
    /// Absolute index into the unfiltered question list
    pub cursor: usize,
    /// Case-insensitive substring filter on model_name; empty = match-all
    pub filter: String,
}

impl Session {
    /// Open an anonymous session: questions from the source file, annotations
    /// from the local JSON document. A missing or malformed question source
    /// is fatal.
    pub async fn open_anonymous(paths: &StoragePaths) -> Result<Self> {
        let questions = QuestionStore::load(&paths.questions(), &paths.local_questions())?;
        let annotations = AnnotationStore::open(Box::new(JsonFileAnnotationRepository::new(
            paths.local_annotations(),
        )))
        .await;

        Ok(Self {
            questions,
            annotations,
            user: None,
            cursor: 0,
            filter: String::new(),
        })
    }

    /// Switch to the signed-in backend and reload annotations for the user
    pub async fn sign_in(&mut self, pool: &SqlitePool, user: User) {
        self.annotations = AnnotationStore::open(Box::new(SqliteAnnotationRepository::new(
            pool.clone(),
            user.guid.clone(),
        )))
        .await;
        self.user = Some(user);
    }

    /// Return to the anonymous backend and reload from the local document
    pub async fn sign_out(&mut self, paths: &StoragePaths) {
        self.annotations = AnnotationStore::open(Box::new(JsonFileAnnotationRepository::new(
            paths.local_annotations(),
        )))
        .await;
        self.user = None;
    }

    /// Questions visible under the current filter, in original order
    pub fn filtered(&self) -> Vec<&Question> {
        let questions = self.questions.questions();
        cursor::filtered_indices(questions, &self.filter)
            .into_iter()
            .map(|i| &questions[i])
            .collect()
    }

    /// Position of the cursor within the filtered view, if visible
    pub fn cursor_position(&self) -> Option<usize> {
        cursor::filtered_position(self.questions.questions(), &self.filter, self.cursor)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    /// Re-validate the cursor against the filter and question list
    pub fn reconcile(&mut self) {
        self.cursor =
            cursor::reconcile_cursor(self.questions.questions(), &self.filter, self.cursor);
    }

    pub fn set_filter(&mut self, filter: String) {
        self.filter = filter;
        self.reconcile();
    }

    pub fn step(&mut self, delta: i64) {
        self.cursor = cursor::step(self.questions.questions(), &self.filter, self.cursor, delta);
    }

    /// Jump to a 1-based position in the filtered view; out-of-range input
    /// is a silent no-op
    pub fn jump(&mut self, one_based: usize) {
        if let Some(cursor) =
            cursor::jump(self.questions.questions(), &self.filter, one_based)
        {
            self.cursor = cursor;
        }
    }

    /// Add a locally-created question and keep the cursor on the question
    /// it was pointing at (prepending shifts every absolute index by one)
    pub fn add_question(&mut self, draft: QuestionDraft) -> Result<Question> {
        let was_empty = self.questions.is_empty();
        let question = self.questions.add(draft)?;
        if !was_empty {
            self.cursor += 1;
        }
        self.reconcile();
        Ok(question)
    }
}
