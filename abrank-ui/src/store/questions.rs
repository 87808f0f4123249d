//! Question store
//!
//! Loads the ordered source question set from a JSON file and layers
//! locally-created questions on top. Locally-created questions get strictly
//! decreasing negative ids so they never collide with source ids, without
//! needing a central id authority.

use abrank_common::db::{Question, QuestionDraft};
use abrank_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// In-memory question list: locally-created questions (newest first)
/// followed by the source set
pub struct QuestionStore {
    local: Vec<Question>,
    source: Vec<Question>,
    combined: Vec<Question>,
    local_path: PathBuf,
}

impl QuestionStore {
    /// Load the source question set and any locally-created questions.
    ///
    /// A missing or malformed source file is a fetch error; the annotation
    /// UI cannot run without its question set. A missing or malformed
    /// local-question file degrades to an empty list.
    pub fn load(source_path: &Path, local_path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(source_path).map_err(|e| {
            Error::Fetch(format!(
                "Cannot read question source {}: {}",
                source_path.display(),
                e
            ))
        })?;
        let source: Vec<Question> = serde_json::from_str(&text).map_err(|e| {
            Error::Fetch(format!(
                "Question source {} is not valid JSON: {}",
                source_path.display(),
                e
            ))
        })?;

        let local = match std::fs::read_to_string(local_path) {
            Ok(text) => match serde_json::from_str::<Vec<Question>>(&text) {
                Ok(local) => local,
                Err(e) => {
                    warn!(
                        "Ignoring malformed local questions {}: {}",
                        local_path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        let mut store = Self {
            local,
            source,
            combined: Vec::new(),
            local_path: local_path.to_path_buf(),
        };
        store.rebuild();
        Ok(store)
    }

    /// Full question list: local questions (newest first), then source set
    pub fn questions(&self) -> &[Question] {
        &self.combined
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.combined.get(index)
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.combined.iter().any(|q| q.id == id)
    }

    /// Create a question with a synthesized negative id and prepend it.
    ///
    /// The new id is `min(existing ids) - 1`, or 0 for an empty store, so
    /// every locally-created id sorts below every id present before it.
    /// The caller validates field content; the store only assigns identity
    /// and persists the local list.
    pub fn add(&mut self, draft: QuestionDraft) -> Result<Question> {
        let id = next_local_id(self.combined.iter().map(|q| q.id));
        let question = Question {
            id,
            question: draft.question,
            answer_a: draft.answer_a,
            answer_b: draft.answer_b,
            model_name: draft.model_name,
        };

        self.local.insert(0, question.clone());
        self.rebuild();
        self.persist_local()?;

        Ok(question)
    }

    fn rebuild(&mut self) {
        self.combined = self.local.iter().chain(self.source.iter()).cloned().collect();
    }

    fn persist_local(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.local)?;
        std::fs::write(&self.local_path, text)?;
        Ok(())
    }
}

/// Next id for a locally-created question: `min(existing) - 1`, or 0 if
/// the store is empty
fn next_local_id(ids: impl Iterator<Item = i64>) -> i64 {
    match ids.min() {
        Some(min) => min - 1,
        None => 0,
    }
}

/// Extract the filename of a markdown image reference `![alt](path)`
/// embedded in question text, if any
pub fn image_filename(text: &str) -> Option<String> {
    let start = text.find("![")?;
    let rest = &text[start..];
    let open = rest.find("](")?;
    let close = rest[open + 2..].find(')')?;
    let path = &rest[open + 2..open + 2 + close];
    if path.is_empty() {
        return None;
    }
    let filename = path.rsplit('/').next().unwrap_or(path);
    if filename.is_empty() {
        None
    } else {
        Some(filename.to_string())
    }
}
