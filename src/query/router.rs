//! Query Router - picks the narrowest access path for a list query
//!
//! Priority, per entity:
//! 1. hash key and index range argument present -> secondary-index query
//! 2. only the hash key present -> primary-key query
//! 3. nothing identifying -> full scan
//!
//! Remaining arguments become post-filter terms, conjoined only when present.

use chrono::{DateTime, Utc};

use crate::app::{App, AppStatus};
use crate::storage::{conjoin, encode_timestamp, Access, Condition, Item};

/// A chosen access path plus its post-filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    pub access: Access,
    pub filter: Option<Condition>,
}

/// Filter arguments of `appList`
#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub app_id: Option<String>,
    pub target_id: Option<String>,
    pub platform: Option<String>,
    pub statuses: Vec<AppStatus>,
}

/// Filter arguments of `appConfigList`
#[derive(Debug, Clone, Default)]
pub struct AppConfigFilter {
    pub platform: Option<String>,
    pub app_id: Option<String>,
}

/// Filter arguments of `threadList`
#[derive(Debug, Clone, Default)]
pub struct ThreadFilter {
    pub platform: Option<String>,
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// An argument counts as supplied only when it is non-empty.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn select_access(hash_key: Option<&str>, index_range: Option<&str>) -> Access {
    match (hash_key, index_range) {
        (Some(hash_key), Some(range)) => Access::IndexQuery {
            hash_key: hash_key.to_string(),
            range_key: Some(range.to_string()),
        },
        (Some(hash_key), None) => Access::Query {
            hash_key: hash_key.to_string(),
            range_key: None,
        },
        (None, _) => Access::Scan,
    }
}

pub fn app_list_plan(filter: &AppFilter) -> ListPlan {
    let access = select_access(present(&filter.app_id), present(&filter.target_id));

    let platform = present(&filter.platform).map(|p| Condition::eq("platform", p));
    let statuses = (!filter.statuses.is_empty())
        .then(|| Condition::is_in("status", filter.statuses.iter().map(AppStatus::as_str)));

    ListPlan {
        access,
        filter: [platform, statuses].into_iter().fold(None, conjoin),
    }
}

pub fn app_config_list_plan(filter: &AppConfigFilter) -> ListPlan {
    ListPlan {
        access: select_access(present(&filter.platform), present(&filter.app_id)),
        filter: None,
    }
}

pub fn thread_list_plan(filter: &ThreadFilter) -> ListPlan {
    let access = select_access(present(&filter.platform), present(&filter.user_id));

    let created_at = filter
        .created_at
        .map(|ts| Condition::ge("created_at", encode_timestamp(&ts)));
    let app_id = present(&filter.app_id).map(|id| Condition::eq("app_id", id));

    ListPlan {
        access,
        filter: [created_at, app_id].into_iter().fold(None, conjoin),
    }
}

/// Installed apps for one `(platform, app_id)`; gates app config deletion.
pub fn installed_apps_plan(platform: &str, app_id: &str) -> ListPlan {
    app_list_plan(&AppFilter {
        app_id: Some(app_id.to_string()),
        platform: Some(platform.to_string()),
        statuses: vec![AppStatus::Installed],
        ..Default::default()
    })
}

/// Threads opened through one app; gates app deletion.
pub fn app_threads_plan(app: &App) -> ListPlan {
    thread_list_plan(&ThreadFilter {
        platform: Some(app.platform.clone()),
        app_id: Some(app.app_id.clone()),
        ..Default::default()
    })
}

/// Index name used by a plan, for logging.
pub fn index_name<I: Item>(plan: &ListPlan) -> Option<&'static str> {
    match plan.access {
        Access::IndexQuery { .. } => I::INDEX.map(|index| index.name),
        _ => None,
    }
}
