//! Paginator - runs a list plan one page at a time with a total count

use serde::Serialize;

use super::router::{index_name, ListPlan};
use crate::storage::{Access, Item, ItemStore, Window};
use crate::Result;

pub const DEFAULT_PAGE_SIZE: u64 = 100;

const MAX_WINDOW: u64 = i64::MAX as u64;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Missing or non-positive arguments fall back to page 1 / `default_limit`.
    pub fn new(page_number: Option<i64>, limit: Option<i64>, default_limit: u64) -> Self {
        let page_number = page_number.filter(|n| *n > 0).map(|n| n as u64).unwrap_or(1);
        let limit = limit
            .filter(|n| *n > 0)
            .map(|n| n as u64)
            .unwrap_or(default_limit.max(1));
        Self { page_number, limit }
    }

    /// Offset and limit both stay within SQLite's signed 64-bit range.
    pub fn window(&self) -> Window {
        let offset = (self.page_number - 1)
            .checked_mul(self.limit)
            .unwrap_or(MAX_WINDOW)
            .min(MAX_WINDOW);
        Window {
            offset,
            limit: self.limit.min(MAX_WINDOW),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub page_number: u64,
    pub page_size: u64,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            page_number: self.page_number,
            page_size: self.page_size,
            total: self.total,
            items,
        }
    }
}

/// Count and fetch one page through the plan's access path.
pub fn paginate<I: Item, S: ItemStore>(
    store: &S,
    plan: &ListPlan,
    request: PageRequest,
) -> Result<Page<I>> {
    let filter = plan.filter.as_ref();
    let total = store.count::<I>(&plan.access, filter)?;
    let window = Some(request.window());

    let items = match &plan.access {
        Access::Scan => store.scan::<I>(filter, window)?,
        Access::Query { hash_key, range_key } => {
            store.query::<I>(hash_key, range_key.as_deref(), filter, window)?
        }
        Access::IndexQuery { hash_key, range_key } => {
            store.index_query::<I>(hash_key, range_key.as_deref(), filter, window)?
        }
    };

    tracing::debug!(
        table = I::TABLE,
        access = plan.access.name(),
        index = index_name::<I>(plan),
        total,
        returned = items.len(),
        "paginated"
    );

    Ok(Page {
        page_number: request.page_number,
        page_size: request.limit,
        total,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfig;
    use crate::query::router::{app_config_list_plan, AppConfigFilter};
    use crate::storage::SqliteStore;
    use chrono::Utc;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None, 25), PageRequest { page_number: 1, limit: 25 });
        assert_eq!(PageRequest::new(Some(0), Some(-3), 25), PageRequest { page_number: 1, limit: 25 });
        assert_eq!(
            PageRequest::new(Some(3), Some(10), 25).window(),
            Window { offset: 20, limit: 10 }
        );
    }

    #[test]
    fn test_paginate_reports_total_and_page() {
        let store = SqliteStore::open_in_memory().unwrap();
        for i in 0..7 {
            store
                .save(&AppConfig::new("slack", format!("app-{}", i), serde_json::json!({}), Utc::now()))
                .unwrap();
        }
        store
            .save(&AppConfig::new("teams", "app-9", serde_json::json!({}), Utc::now()))
            .unwrap();

        let plan = app_config_list_plan(&AppConfigFilter {
            platform: Some("slack".to_string()),
            app_id: None,
        });
        let page: Page<AppConfig> = paginate(&store, &plan, PageRequest::new(Some(2), Some(3), 100)).unwrap();

        assert_eq!(page.total, 7);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 3);
        let ids: Vec<_> = page.items.iter().map(|c| c.app_id.as_str()).collect();
        assert_eq!(ids, vec!["app-3", "app-4", "app-5"]);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .save(&AppConfig::new("slack", "app-1", serde_json::json!({}), Utc::now()))
            .unwrap();

        let plan = app_config_list_plan(&AppConfigFilter::default());
        let page: Page<AppConfig> = paginate(&store, &plan, PageRequest::new(Some(5), Some(10), 100)).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_huge_window_is_clamped() {
        let window = PageRequest::new(Some(3), Some(i64::MAX), 100).window();
        assert_eq!(window, Window { offset: i64::MAX as u64, limit: i64::MAX as u64 });

        let window = PageRequest::new(Some(i64::MAX), Some(i64::MAX), 100).window();
        assert_eq!(window.offset, i64::MAX as u64);
    }

    #[test]
    fn test_huge_page_number_is_empty_not_first_page() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .save(&AppConfig::new("slack", "app-1", serde_json::json!({}), Utc::now()))
            .unwrap();

        let plan = app_config_list_plan(&AppConfigFilter::default());
        let page: Page<AppConfig> =
            paginate(&store, &plan, PageRequest::new(Some(3), Some(i64::MAX), 100)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.page_number, 3);
        assert!(page.items.is_empty());
    }
}
