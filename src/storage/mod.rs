//! Storage Layer - key-value item tables backed by SQLite
//!
//! Every table is addressed by a composite `(hash, range)` key and may carry
//! one secondary index sharing the table's hash key:
//! - ace_apps(app_id, target_id), index target_id-index
//! - ace_app_configs(platform, app_id), index app_id-index
//! - ace_threads(platform, thread_uuid), index user_id-index
//!
//! The store never chooses an access path on its own; callers pick scan,
//! query or index query (see `query::router`).

pub mod change;
pub mod condition;
pub mod items;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod recording;

pub use change::{ChangeSet, FieldChange, NULL_SENTINEL};
pub use condition::{conjoin, Condition};
pub use sqlite::{DbStats, SqliteStore};

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Composite primary key of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub hash: String,
    pub range: String,
}

impl ItemKey {
    pub fn new(hash: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            range: range.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.hash, self.range)
    }
}

/// A secondary index over a table. The index hash key is the table's hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: &'static str,
    pub range_key: &'static str,
}

/// How a read reaches the rows of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Full table scan
    Scan,
    /// Primary-key query, optionally pinned to one range key
    Query {
        hash_key: String,
        range_key: Option<String>,
    },
    /// Secondary-index query, optionally pinned to one index range key
    IndexQuery {
        hash_key: String,
        range_key: Option<String>,
    },
}

impl Access {
    /// Access path addressing exactly one primary key.
    pub fn point(key: &ItemKey) -> Self {
        Access::Query {
            hash_key: key.hash.clone(),
            range_key: Some(key.range.clone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Access::Scan => "scan",
            Access::Query { .. } => "query",
            Access::IndexQuery { .. } => "index_query",
        }
    }
}

/// A slice of a result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// A record type stored in one table.
pub trait Item: Sized + Send + Sync + 'static {
    const TABLE: &'static str;
    const HASH_KEY: &'static str;
    const RANGE_KEY: &'static str;
    const INDEX: Option<SecondaryIndex>;
    /// All columns, in the order used by `to_values` and `from_row`
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> ItemKey;

    fn to_values(&self) -> Result<Vec<rusqlite::types::Value>>;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// Primitive operations over item tables.
pub trait ItemStore: Send + Sync {
    /// Fetch one item by primary key, failing with `Error::NotFound`.
    fn get<I: Item>(&self, key: &ItemKey) -> Result<I>;

    /// Count the items reachable through `access` that pass `filter`.
    fn count<I: Item>(&self, access: &Access, filter: Option<&Condition>) -> Result<u64>;

    fn scan<I: Item>(&self, filter: Option<&Condition>, window: Option<Window>) -> Result<Vec<I>>;

    fn query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>>;

    fn index_query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>>;

    /// Unconditional create-or-replace.
    fn save<I: Item>(&self, item: &I) -> Result<()>;

    /// Apply a change set to an existing item.
    fn update<I: Item>(&self, key: &ItemKey, changes: &ChangeSet) -> Result<()>;

    fn delete<I: Item>(&self, key: &ItemKey) -> Result<()>;
}

/// Fixed-width RFC 3339 form, so stored timestamps compare correctly as text.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp(format!("{}: {}", s, e)))
}
