//! Error types for metadata harvesting

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    #[error("Composition cycle detected: kind '{0}' reaches itself through parent or equivalent kinds")]
    CompositionCycle(String),

    #[error("Invalid kind declaration: {0}")]
    InvalidRegistry(String),

    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Query execution against {endpoint} failed: {reason}")]
    QueryExecution { endpoint: String, reason: String },

    #[error("Cycle detected: entity '{0}' references itself through its metadata graph")]
    CycleDetected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

impl MetaError {
    pub(crate) fn invalid_filter(filter: &str, reason: impl Into<String>) -> Self {
        MetaError::InvalidFilter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether a harvest may skip the affected root entity instead of aborting
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, MetaError::UnknownKind(_) | MetaError::CycleDetected(_))
    }
}
