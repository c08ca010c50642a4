//! App configuration - one configuration document per `(platform, app_id)`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-platform configuration of an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hash key
    pub platform: String,
    /// Range key
    pub app_id: String,
    pub configuration: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppConfig {
    pub fn new(
        platform: impl Into<String>,
        app_id: impl Into<String>,
        configuration: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            platform: platform.into(),
            app_id: app_id.into(),
            configuration,
            created_at: now,
            updated_at: now,
        }
    }

    /// The part of a config embedded into app responses.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "platform": self.platform,
            "app_id": self.app_id,
            "configuration": self.configuration,
        })
    }
}
