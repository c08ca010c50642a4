//! GraphQL object types and their conversions from domain records

use async_graphql::{Json, SimpleObject};
use chrono::{DateTime, Utc};

use crate::app_config::AppConfig;
use crate::query::Page;
use crate::service::AppView;
use crate::thread::Thread;

/// JSON scalar that renders an absent document as `null`.
fn document(value: serde_json::Value) -> Option<Json<serde_json::Value>> {
    (!value.is_null()).then_some(Json(value))
}

fn count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AppType {
    pub app_id: String,
    pub target_id: String,
    pub platform: String,
    pub access_token: Option<String>,
    pub scope: Option<String>,
    pub user_id: Option<String>,
    pub data: Option<Json<serde_json::Value>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Snapshot of the app's configuration on its platform
    pub app_config: Option<Json<serde_json::Value>>,
}

impl From<AppView> for AppType {
    fn from(view: AppView) -> Self {
        let app = view.app;
        Self {
            app_id: app.app_id,
            target_id: app.target_id,
            platform: app.platform,
            access_token: app.access_token,
            scope: app.scope,
            user_id: app.user_id,
            data: document(app.data),
            status: app.status.to_string(),
            created_at: app.created_at,
            updated_at: app.updated_at,
            app_config: view.app_config.map(Json),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AppListType {
    pub page_size: i64,
    pub page_number: i64,
    pub total: i64,
    pub app_list: Vec<AppType>,
}

impl From<Page<AppView>> for AppListType {
    fn from(page: Page<AppView>) -> Self {
        Self {
            page_size: count(page.page_size),
            page_number: count(page.page_number),
            total: count(page.total),
            app_list: page.items.into_iter().map(AppType::from).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AppConfigType {
    pub platform: String,
    pub app_id: String,
    pub configuration: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AppConfig> for AppConfigType {
    fn from(config: AppConfig) -> Self {
        Self {
            platform: config.platform,
            app_id: config.app_id,
            configuration: document(config.configuration),
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AppConfigListType {
    pub page_size: i64,
    pub page_number: i64,
    pub total: i64,
    pub app_config_list: Vec<AppConfigType>,
}

impl From<Page<AppConfig>> for AppConfigListType {
    fn from(page: Page<AppConfig>) -> Self {
        Self {
            page_size: count(page.page_size),
            page_number: count(page.page_number),
            total: count(page.total),
            app_config_list: page.items.into_iter().map(AppConfigType::from).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ThreadType {
    pub platform: String,
    pub thread_uuid: String,
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Thread> for ThreadType {
    fn from(thread: Thread) -> Self {
        Self {
            platform: thread.platform,
            thread_uuid: thread.thread_uuid,
            app_id: thread.app_id,
            user_id: thread.user_id,
            created_at: thread.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ThreadListType {
    pub page_size: i64,
    pub page_number: i64,
    pub total: i64,
    pub thread_list: Vec<ThreadType>,
}

impl From<Page<Thread>> for ThreadListType {
    fn from(page: Page<Thread>) -> Self {
        Self {
            page_size: count(page.page_size),
            page_number: count(page.page_number),
            total: count(page.total),
            thread_list: page.items.into_iter().map(ThreadType::from).collect(),
        }
    }
}

// Mutation payloads

#[derive(Debug, Clone, SimpleObject)]
pub struct InsertUpdateApp {
    pub app: AppType,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct InsertUpdateAppConfig {
    pub app_config: AppConfigType,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct InsertThread {
    pub thread: ThreadType,
}

/// Outcome of a delete; `false` when an integrity check refused it.
#[derive(Debug, Clone, SimpleObject)]
pub struct DeleteResult {
    pub ok: bool,
}
