//! Question and annotation stores

pub mod annotations;
pub mod questions;

pub use annotations::{
    AnnotationRepository, AnnotationStore, JsonFileAnnotationRepository,
    SqliteAnnotationRepository,
};
pub use questions::QuestionStore;
