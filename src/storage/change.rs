//! Change sets - the explicit list of field mutations applied by an update

use crate::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use super::encode_timestamp;

/// Literal value a caller sends to clear a field.
pub const NULL_SENTINEL: &str = "null";

/// One `SET attr = value`. `Value::Null` clears the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub attr: &'static str,
    pub value: Value,
}

/// Accumulates only the fields present in a request, in the order given.
///
/// Every change set refreshes `updated_at`; `created_at` is never part of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn touched(now: DateTime<Utc>) -> Self {
        Self {
            changes: vec![FieldChange {
                attr: "updated_at",
                value: Value::Text(encode_timestamp(&now)),
            }],
        }
    }

    /// Set a text field if present; the sentinel clears it.
    pub fn text(mut self, attr: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            let value = if value == NULL_SENTINEL {
                Value::Null
            } else {
                Value::Text(value.to_string())
            };
            self.changes.push(FieldChange { attr, value });
        }
        self
    }

    /// Set a JSON field if present; JSON null or the sentinel string clears it.
    pub fn json(mut self, attr: &'static str, value: Option<&serde_json::Value>) -> Result<Self> {
        if let Some(value) = value {
            let value = match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::String(s) if s == NULL_SENTINEL => Value::Null,
                other => Value::Text(serde_json::to_string(other)?),
            };
            self.changes.push(FieldChange { attr, value });
        }
        Ok(self)
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn touches(&self, attr: &str) -> bool {
        self.changes.iter().any(|c| c.attr == attr)
    }
}
