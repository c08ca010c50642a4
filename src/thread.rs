//! Conversation threads - immutable once created

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation thread opened by a user through an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Hash key
    pub platform: String,
    /// Range key
    pub thread_uuid: String,
    /// Owning app
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(
        platform: impl Into<String>,
        thread_uuid: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            platform: platform.into(),
            thread_uuid: thread_uuid.into(),
            app_id: None,
            user_id: None,
            created_at: now,
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}
