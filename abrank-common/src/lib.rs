//! # abrank Common Library
//!
//! Shared code for the abrank annotation service:
//! - Database initialization and models
//! - Configuration and root folder resolution
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
