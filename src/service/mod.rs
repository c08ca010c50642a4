//! Lifecycle operations over the three entity tables
//!
//! `Engine` owns the store handle and the read-retry policy. Reads go through
//! an existence count before the retried point fetch; list reads go through
//! the query router and the paginator.

pub mod app;
pub mod app_config;
pub mod thread;

pub use app::{AppUpsert, AppView};
pub use thread::ThreadInsert;

use std::sync::Arc;

use crate::query::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::retry::{retry, RetryPolicy};
use crate::storage::{Access, Item, ItemKey, ItemStore};
use crate::Result;

/// Entry point for every query and mutation.
pub struct Engine<S> {
    store: Arc<S>,
    retry: RetryPolicy,
    page_size: u64,
}

impl<S: ItemStore> Engine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Liveness probe.
    pub fn ping(&self) -> String {
        format!("Hello at {}!!", chrono::Local::now().format("%X"))
    }

    pub fn page_request(&self, page_number: Option<i64>, limit: Option<i64>) -> PageRequest {
        PageRequest::new(page_number, limit, self.page_size)
    }

    /// Point read, retried on transient failures.
    async fn fetch<I: Item>(&self, key: &ItemKey) -> Result<I> {
        let store = self.store.as_ref();
        retry(&self.retry, I::TABLE, || store.get::<I>(key)).await
    }

    /// Existence count first, so a missing row is `None` rather than an error.
    async fn find<I: Item>(&self, key: &ItemKey) -> Result<Option<I>> {
        if self.store.count::<I>(&Access::point(key), None)? == 0 {
            return Ok(None);
        }
        self.fetch(key).await.map(Some)
    }
}

/// Treat the clear sentinel as "no value" when creating a record.
fn creatable(value: Option<String>) -> Option<String> {
    value.filter(|v| v != crate::storage::NULL_SENTINEL)
}
