//! Annotation store
//!
//! In-memory annotation map with a pluggable persistence backend. Signed-in
//! sessions write through to per-user rows in the sqlite database; anonymous
//! sessions serialize the whole map to a fixed JSON file. Persistence is
//! best-effort by contract: the in-memory map is updated first and a failed
//! write is logged, not surfaced.

use abrank_common::db::{self, Annotation, AnnotationLabel};
use abrank_common::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Persistence backend for the annotation map
///
/// `put` receives both the changed record and a snapshot of the full map so
/// document-style backends can rewrite their whole blob.
#[async_trait]
pub trait AnnotationRepository: Send + Sync {
    async fn load_all(&self) -> Result<BTreeMap<i64, Annotation>>;

    async fn put(
        &self,
        question_id: i64,
        record: &Annotation,
        snapshot: &BTreeMap<i64, Annotation>,
    ) -> Result<()>;
}

/// Signed-in backend: per-user rows in the annotations table
pub struct SqliteAnnotationRepository {
    pool: SqlitePool,
    user_id: String,
}

impl SqliteAnnotationRepository {
    pub fn new(pool: SqlitePool, user_id: String) -> Self {
        Self { pool, user_id }
    }
}

#[async_trait]
impl AnnotationRepository for SqliteAnnotationRepository {
    async fn load_all(&self) -> Result<BTreeMap<i64, Annotation>> {
        db::load_annotations(&self.pool, &self.user_id).await
    }

    async fn put(
        &self,
        question_id: i64,
        record: &Annotation,
        _snapshot: &BTreeMap<i64, Annotation>,
    ) -> Result<()> {
        db::upsert_annotation(&self.pool, &self.user_id, question_id, record).await
    }
}

/// Anonymous backend: the whole map as one JSON document at a fixed path
pub struct JsonFileAnnotationRepository {
    path: PathBuf,
}

impl JsonFileAnnotationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl AnnotationRepository for JsonFileAnnotationRepository {
    async fn load_all(&self) -> Result<BTreeMap<i64, Annotation>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return Ok(BTreeMap::new()),
        };
        match serde_json::from_str(&text) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(
                    "Ignoring malformed annotation file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn put(
        &self,
        _question_id: i64,
        _record: &Annotation,
        snapshot: &BTreeMap<i64, Annotation>,
    ) -> Result<()> {
        let text = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Per-label annotation counts
#[derive(Debug, Default, Clone, Serialize)]
pub struct LabelDistribution {
    pub both_correct: usize,
    pub a_better: usize,
    pub b_better: usize,
    pub not_sure: usize,
}

/// Derived summary of the annotation map
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationStats {
    pub total: usize,
    pub distribution: LabelDistribution,
    pub most_recent: Option<String>,
}

/// In-memory annotation map with write-through persistence
pub struct AnnotationStore {
    map: BTreeMap<i64, Annotation>,
    repo: Box<dyn AnnotationRepository>,
}

impl AnnotationStore {
    /// Open the store, loading whatever the backend has.
    ///
    /// A failed read is treated as "no annotations yet", not an error.
    pub async fn open(repo: Box<dyn AnnotationRepository>) -> Self {
        let map = match repo.load_all().await {
            Ok(map) => map,
            Err(e) => {
                warn!("Failed to load annotations, starting empty: {}", e);
                BTreeMap::new()
            }
        };
        Self { map, repo }
    }

    pub fn get(&self, question_id: i64) -> Option<&Annotation> {
        self.map.get(&question_id)
    }

    pub fn all(&self) -> &BTreeMap<i64, Annotation> {
        &self.map
    }

    /// Upsert an annotation: update memory first, then persist best-effort.
    ///
    /// A failed persist is logged and swallowed; the caller always gets the
    /// stored record back. Last write wins, no versioning.
    pub async fn put(
        &mut self,
        question_id: i64,
        answer: AnnotationLabel,
        comments: Option<String>,
    ) -> Annotation {
        let record = Annotation {
            answer,
            comments,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        self.map.insert(question_id, record.clone());

        if let Err(e) = self.repo.put(question_id, &record, &self.map).await {
            warn!(
                "Best-effort persist failed for annotation on question {}: {}",
                question_id, e
            );
        }

        record
    }

    /// Summary counts, tolerating an empty map
    pub fn statistics(&self) -> AnnotationStats {
        let mut distribution = LabelDistribution::default();
        for annotation in self.map.values() {
            match annotation.answer {
                AnnotationLabel::BothCorrect => distribution.both_correct += 1,
                AnnotationLabel::ABetter => distribution.a_better += 1,
                AnnotationLabel::BBetter => distribution.b_better += 1,
                AnnotationLabel::NotSure => distribution.not_sure += 1,
            }
        }

        let most_recent = self
            .map
            .values()
            .map(|a| a.timestamp.clone())
            .max();

        AnnotationStats {
            total: self.map.len(),
            distribution,
            most_recent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abrank_common::Error;
    use tempfile::TempDir;

    /// Backend whose writes always fail, for the best-effort contract
    struct FailingRepository;

    #[async_trait]
    impl AnnotationRepository for FailingRepository {
        async fn load_all(&self) -> Result<BTreeMap<i64, Annotation>> {
            Err(Error::Internal("backend offline".to_string()))
        }

        async fn put(
            &self,
            _question_id: i64,
            _record: &Annotation,
            _snapshot: &BTreeMap<i64, Annotation>,
        ) -> Result<()> {
            Err(Error::Internal("backend offline".to_string()))
        }
    }

    fn file_repo(dir: &TempDir) -> Box<JsonFileAnnotationRepository> {
        Box::new(JsonFileAnnotationRepository::new(
            dir.path().join("local_annotations.json"),
        ))
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_question() {
        let dir = TempDir::new().unwrap();
        let mut store = AnnotationStore::open(file_repo(&dir)).await;

        store
            .put(7, AnnotationLabel::ABetter, Some("x".to_string()))
            .await;
        store
            .put(7, AnnotationLabel::BBetter, None)
            .await;

        assert_eq!(store.all().len(), 1);
        let current = store.get(7).unwrap();
        assert_eq!(current.answer, AnnotationLabel::BBetter);
        assert_eq!(current.comments, None);
    }

    #[tokio::test]
    async fn test_upsert_idempotent_except_timestamp() {
        let dir = TempDir::new().unwrap();
        let mut store = AnnotationStore::open(file_repo(&dir)).await;

        let first = store
            .put(3, AnnotationLabel::ABetter, Some("x".to_string()))
            .await;
        let second = store
            .put(3, AnnotationLabel::ABetter, Some("x".to_string()))
            .await;

        assert_eq!(first.answer, second.answer);
        assert_eq!(first.comments, second.comments);
        // RFC 3339 timestamps compare lexicographically
        assert!(second.timestamp >= first.timestamp);
    }

    #[tokio::test]
    async fn test_file_backend_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut store = AnnotationStore::open(file_repo(&dir)).await;
        store
            .put(1, AnnotationLabel::BothCorrect, Some("fine".to_string()))
            .await;
        store.put(2, AnnotationLabel::NotSure, None).await;

        let reloaded = AnnotationStore::open(file_repo(&dir)).await;
        assert_eq!(reloaded.all(), store.all());
    }

    #[tokio::test]
    async fn test_failed_backend_degrades_to_empty_and_swallows_writes() {
        let mut store = AnnotationStore::open(Box::new(FailingRepository)).await;
        assert!(store.all().is_empty());

        // Write fails behind the scenes; caller still sees the record
        let record = store.put(5, AnnotationLabel::ABetter, None).await;
        assert_eq!(record.answer, AnnotationLabel::ABetter);
        assert_eq!(store.get(5), Some(&record));
    }

    #[tokio::test]
    async fn test_statistics_on_empty_map() {
        let dir = TempDir::new().unwrap();
        let store = AnnotationStore::open(file_repo(&dir)).await;

        let stats = store.statistics();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.distribution.a_better, 0);
        assert_eq!(stats.most_recent, None);
    }

    #[tokio::test]
    async fn test_statistics_distribution_and_most_recent() {
        let dir = TempDir::new().unwrap();
        let mut store = AnnotationStore::open(file_repo(&dir)).await;

        store.put(1, AnnotationLabel::ABetter, None).await;
        store.put(2, AnnotationLabel::ABetter, None).await;
        store.put(3, AnnotationLabel::NotSure, None).await;
        let last = store.put(4, AnnotationLabel::BothCorrect, None).await;

        let stats = store.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.distribution.a_better, 2);
        assert_eq!(stats.distribution.not_sure, 1);
        assert_eq!(stats.distribution.both_correct, 1);
        assert_eq!(stats.distribution.b_better, 0);
        assert_eq!(stats.most_recent, Some(last.timestamp));
    }

    #[tokio::test]
    async fn test_sqlite_backend_round_trip() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        abrank_common::db::create_tables(&pool).await.unwrap();
        let user = db::find_or_create_user(&pool, "alice").await.unwrap();

        let repo = || {
            Box::new(SqliteAnnotationRepository::new(
                pool.clone(),
                user.guid.clone(),
            ))
        };

        let mut store = AnnotationStore::open(repo()).await;
        store
            .put(10, AnnotationLabel::BBetter, Some("b wins".to_string()))
            .await;
        store.put(2, AnnotationLabel::NotSure, None).await;

        let reloaded = AnnotationStore::open(repo()).await;
        assert_eq!(reloaded.all(), store.all());
        // Ordered by question id
        let ids: Vec<i64> = reloaded.all().keys().copied().collect();
        assert_eq!(ids, vec![2, 10]);
    }
}
