//! Row mapping for the three item tables

use rusqlite::types::{Type, Value};
use rusqlite::Row;

use super::{decode_timestamp, encode_timestamp, Item, ItemKey, SecondaryIndex};
use crate::app::{App, AppStatus};
use crate::app_config::AppConfig;
use crate::thread::Thread;
use crate::Result;

fn conversion_error(idx: usize, err: crate::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: &Option<String>) -> Value {
    value.as_deref().map(text).unwrap_or(Value::Null)
}

fn json(value: &serde_json::Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(serde_json::to_string(value)?))
}

fn timestamp(value: &chrono::DateTime<chrono::Utc>) -> Value {
    Value::Text(encode_timestamp(value))
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<serde_json::Value> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e.into())),
        None => Ok(serde_json::Value::Null),
    }
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let raw: String = row.get(idx)?;
    decode_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

impl Item for App {
    const TABLE: &'static str = "ace_apps";
    const HASH_KEY: &'static str = "app_id";
    const RANGE_KEY: &'static str = "target_id";
    const INDEX: Option<SecondaryIndex> = Some(SecondaryIndex {
        name: "target_id-index",
        range_key: "target_id",
    });
    const COLUMNS: &'static [&'static str] = &[
        "app_id",
        "target_id",
        "platform",
        "access_token",
        "scope",
        "user_id",
        "data",
        "status",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> ItemKey {
        ItemKey::new(&self.app_id, &self.target_id)
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.app_id),
            text(&self.target_id),
            text(&self.platform),
            optional_text(&self.access_token),
            optional_text(&self.scope),
            optional_text(&self.user_id),
            json(&self.data)?,
            text(self.status.as_str()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let status_str: Option<String> = row.get(7)?;
        let status = match status_str {
            Some(s) => s.parse::<AppStatus>().map_err(|e| conversion_error(7, e))?,
            None => AppStatus::default(),
        };

        Ok(App {
            app_id: row.get(0)?,
            target_id: row.get(1)?,
            platform: row.get(2)?,
            access_token: row.get(3)?,
            scope: row.get(4)?,
            user_id: row.get(5)?,
            data: json_column(row, 6)?,
            status,
            created_at: timestamp_column(row, 8)?,
            updated_at: timestamp_column(row, 9)?,
        })
    }
}

impl Item for AppConfig {
    const TABLE: &'static str = "ace_app_configs";
    const HASH_KEY: &'static str = "platform";
    const RANGE_KEY: &'static str = "app_id";
    const INDEX: Option<SecondaryIndex> = Some(SecondaryIndex {
        name: "app_id-index",
        range_key: "app_id",
    });
    const COLUMNS: &'static [&'static str] =
        &["platform", "app_id", "configuration", "created_at", "updated_at"];

    fn key(&self) -> ItemKey {
        ItemKey::new(&self.platform, &self.app_id)
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.platform),
            text(&self.app_id),
            json(&self.configuration)?,
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AppConfig {
            platform: row.get(0)?,
            app_id: row.get(1)?,
            configuration: json_column(row, 2)?,
            created_at: timestamp_column(row, 3)?,
            updated_at: timestamp_column(row, 4)?,
        })
    }
}

impl Item for Thread {
    const TABLE: &'static str = "ace_threads";
    const HASH_KEY: &'static str = "platform";
    const RANGE_KEY: &'static str = "thread_uuid";
    const INDEX: Option<SecondaryIndex> = Some(SecondaryIndex {
        name: "user_id-index",
        range_key: "user_id",
    });
    const COLUMNS: &'static [&'static str] =
        &["platform", "thread_uuid", "app_id", "user_id", "created_at"];

    fn key(&self) -> ItemKey {
        ItemKey::new(&self.platform, &self.thread_uuid)
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.platform),
            text(&self.thread_uuid),
            optional_text(&self.app_id),
            optional_text(&self.user_id),
            timestamp(&self.created_at),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Thread {
            platform: row.get(0)?,
            thread_uuid: row.get(1)?,
            app_id: row.get(2)?,
            user_id: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
        })
    }
}
