//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use super::{schema, Access, ChangeSet, Condition, Item, ItemKey, ItemStore, Window};
use crate::{Error, Result};

/// SQLite-backed item tables
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create any missing tables and indexes
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn();
        for &(table, stmt) in schema::TABLES {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                conn.execute(stmt, [])?;
                tracing::info!("The {} table has been created.", table);
            }
        }
        for stmt in schema::CREATE_INDEXES {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Row counts of every table
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            apps: self.count_rows("ace_apps")?,
            app_configs: self.count_rows("ace_app_configs")?,
            threads: self.count_rows("ace_threads")?,
        })
    }

    fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn().query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Key condition for an access path, as SQL clauses
    fn key_clauses<I: Item>(access: &Access, params: &mut Vec<Value>) -> Result<Vec<String>> {
        let mut clauses = Vec::new();
        let (hash_key, range_key, range_attr) = match access {
            Access::Scan => return Ok(clauses),
            Access::Query { hash_key, range_key } => (hash_key, range_key, I::RANGE_KEY),
            Access::IndexQuery { hash_key, range_key } => {
                let index = I::INDEX.ok_or(Error::MissingIndex(I::TABLE))?;
                (hash_key, range_key, index.range_key)
            }
        };

        clauses.push(format!("{} = ?", I::HASH_KEY));
        params.push(Value::Text(hash_key.clone()));
        if let Some(range) = range_key {
            clauses.push(format!("{} = ?", range_attr));
            params.push(Value::Text(range.clone()));
        }
        Ok(clauses)
    }

    fn where_sql<I: Item>(
        access: &Access,
        filter: Option<&Condition>,
        params: &mut Vec<Value>,
    ) -> Result<String> {
        let mut clauses = Self::key_clauses::<I>(access, params)?;
        if let Some(filter) = filter {
            clauses.push(filter.to_sql(params));
        }
        if clauses.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" WHERE {}", clauses.join(" AND ")))
    }

    fn order_sql<I: Item>(access: &Access) -> String {
        match (access, I::INDEX) {
            (Access::IndexQuery { .. }, Some(index)) if index.range_key != I::RANGE_KEY => {
                format!(" ORDER BY {}, {}", index.range_key, I::RANGE_KEY)
            }
            _ => format!(" ORDER BY {}, {}", I::HASH_KEY, I::RANGE_KEY),
        }
    }

    fn select<I: Item>(
        &self,
        access: &Access,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>> {
        let mut params = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", I::COLUMNS.join(", "), I::TABLE);
        sql.push_str(&Self::where_sql::<I>(access, filter, &mut params)?);
        sql.push_str(&Self::order_sql::<I>(access));
        if let Some(window) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::Integer(i64::try_from(window.limit).unwrap_or(i64::MAX)));
            params.push(Value::Integer(i64::try_from(window.offset).unwrap_or(i64::MAX)));
        }

        tracing::trace!(table = I::TABLE, access = access.name(), %sql, "select");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params.iter()), |row| I::from_row(row))?
            .collect::<rusqlite::Result<Vec<I>>>()?;
        Ok(items)
    }

    fn not_found<I: Item>(key: &ItemKey) -> Error {
        Error::NotFound {
            table: I::TABLE,
            key: key.to_string(),
        }
    }
}

impl ItemStore for SqliteStore {
    fn get<I: Item>(&self, key: &ItemKey) -> Result<I> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 AND {} = ?2",
            I::COLUMNS.join(", "),
            I::TABLE,
            I::HASH_KEY,
            I::RANGE_KEY
        );
        let item = self
            .conn()
            .query_row(&sql, [&key.hash, &key.range], |row| I::from_row(row))
            .optional()?;
        item.ok_or_else(|| Self::not_found::<I>(key))
    }

    fn count<I: Item>(&self, access: &Access, filter: Option<&Condition>) -> Result<u64> {
        let mut params = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", I::TABLE);
        sql.push_str(&Self::where_sql::<I>(access, filter, &mut params)?);

        let count: i64 = self
            .conn()
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn scan<I: Item>(&self, filter: Option<&Condition>, window: Option<Window>) -> Result<Vec<I>> {
        self.select(&Access::Scan, filter, window)
    }

    fn query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>> {
        let access = Access::Query {
            hash_key: hash_key.to_string(),
            range_key: range_key.map(str::to_string),
        };
        self.select(&access, filter, window)
    }

    fn index_query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>> {
        let access = Access::IndexQuery {
            hash_key: hash_key.to_string(),
            range_key: range_key.map(str::to_string),
        };
        self.select(&access, filter, window)
    }

    fn save<I: Item>(&self, item: &I) -> Result<()> {
        let marks = vec!["?"; I::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            I::TABLE,
            I::COLUMNS.join(", "),
            marks
        );
        let values = item.to_values()?;
        self.conn().execute(&sql, params_from_iter(values.iter()))?;
        Ok(())
    }

    fn update<I: Item>(&self, key: &ItemKey, changes: &ChangeSet) -> Result<()> {
        let mut params: Vec<Value> = Vec::new();
        let sets: Vec<String> = changes
            .changes()
            .iter()
            .map(|change| {
                params.push(change.value.clone());
                format!("{} = ?", change.attr)
            })
            .collect();
        params.push(Value::Text(key.hash.clone()));
        params.push(Value::Text(key.range.clone()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ? AND {} = ?",
            I::TABLE,
            sets.join(", "),
            I::HASH_KEY,
            I::RANGE_KEY
        );
        let updated = self.conn().execute(&sql, params_from_iter(params.iter()))?;
        if updated == 0 {
            return Err(Self::not_found::<I>(key));
        }
        Ok(())
    }

    fn delete<I: Item>(&self, key: &ItemKey) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
            I::TABLE,
            I::HASH_KEY,
            I::RANGE_KEY
        );
        let deleted = self.conn().execute(&sql, [&key.hash, &key.range])?;
        if deleted == 0 {
            return Err(Self::not_found::<I>(key));
        }
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbStats {
    pub apps: u64,
    pub app_configs: u64,
    pub threads: u64,
}

impl DbStats {
    pub fn total(&self) -> u64 {
        self.apps + self.app_configs + self.threads
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Apps: {}", self.apps)?;
        writeln!(f, "  App configs: {}", self.app_configs)?;
        writeln!(f, "  Threads: {}", self.threads)
    }
}
