//! # App Core Engine
//!
//! GraphQL facade over a key-value item store.
//!
//! App Core Engine provides:
//! - Three entity tables (apps, app configs, threads) keyed by (hash, range) pairs
//! - A query router that picks scan, primary-key query or secondary-index query
//! - Upsert/delete lifecycle operations with referential-integrity gates
//! - A GraphQL schema served over a single POST endpoint

pub mod app;
pub mod app_config;
pub mod thread;
pub mod storage;
pub mod query;
pub mod service;
pub mod retry;
pub mod monitor;
pub mod graphql;
pub mod server;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use app::{App, AppStatus};
pub use app_config::AppConfig;
pub use thread::Thread;
pub use storage::{ItemKey, ItemStore, SqliteStore};
pub use service::Engine;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for engine operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Item not found in {table}: {key}")]
    NotFound { table: &'static str, key: String },

    #[error("Table {0} has no secondary index")]
    MissingIndex(&'static str),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: AppStatus, to: AppStatus },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Error {
    /// Whether the failure is worth retrying (the store was busy or locked).
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Storage(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_transient() {
        let busy = Error::Storage(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(busy.is_transient());

        let missing = Error::NotFound { table: "ace_apps", key: "a/b".to_string() };
        assert!(!missing.is_transient());
        assert!(missing.is_not_found());
    }
}
