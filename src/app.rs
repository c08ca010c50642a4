//! App records - an application installed against a target
//!
//! An app is identified by `(app_id, target_id)` and carries its platform,
//! credentials and an opaque data map. Installation status only ever moves
//! from `installed` to `uninstalled`.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Installation status of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Installed,
    Uninstalled,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Installed => "installed",
            AppStatus::Uninstalled => "uninstalled",
        }
    }

    pub fn all() -> &'static [AppStatus] {
        &[AppStatus::Installed, AppStatus::Uninstalled]
    }

    /// Check that moving to `next` respects the one-way lifecycle.
    pub fn transition(self, next: AppStatus) -> Result<AppStatus> {
        match (self, next) {
            (AppStatus::Uninstalled, AppStatus::Installed) => {
                Err(Error::InvalidTransition { from: self, to: next })
            }
            _ => Ok(next),
        }
    }
}

impl FromStr for AppStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "installed" => Ok(AppStatus::Installed),
            "uninstalled" => Ok(AppStatus::Uninstalled),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An installed application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Hash key
    pub app_id: String,
    /// Range key
    pub target_id: String,
    pub platform: String,
    pub access_token: Option<String>,
    pub scope: Option<String>,
    pub user_id: Option<String>,
    /// Opaque structured data supplied by the caller
    pub data: serde_json::Value,
    pub status: AppStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl App {
    /// Create a freshly installed app stamped with `now`.
    pub fn new(
        app_id: impl Into<String>,
        target_id: impl Into<String>,
        platform: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            target_id: target_id.into(),
            platform: platform.into(),
            access_token: None,
            scope: None,
            user_id: None,
            data: serde_json::Value::Object(Default::default()),
            status: AppStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_status(mut self, status: AppStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_installed(&self) -> bool {
        self.status == AppStatus::Installed
    }
}
