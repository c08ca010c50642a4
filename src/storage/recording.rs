//! Store double that records which read paths were taken

use std::sync::Mutex;

use super::{Access, ChangeSet, Condition, Item, ItemKey, ItemStore, SqliteStore, Window};
use crate::Result;

/// Wraps an in-memory `SqliteStore` and logs each primitive call as
/// `"<op>:<table>"`.
pub(crate) struct RecordingStore {
    inner: SqliteStore,
    calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record<I: Item>(&self, op: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", op, I::TABLE));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count_of(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub(crate) fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl ItemStore for RecordingStore {
    fn get<I: Item>(&self, key: &ItemKey) -> Result<I> {
        self.record::<I>("get");
        self.inner.get(key)
    }

    fn count<I: Item>(&self, access: &Access, filter: Option<&Condition>) -> Result<u64> {
        self.record::<I>(&format!("count_{}", access.name()));
        self.inner.count::<I>(access, filter)
    }

    fn scan<I: Item>(&self, filter: Option<&Condition>, window: Option<Window>) -> Result<Vec<I>> {
        self.record::<I>("scan");
        self.inner.scan(filter, window)
    }

    fn query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>> {
        self.record::<I>("query");
        self.inner.query(hash_key, range_key, filter, window)
    }

    fn index_query<I: Item>(
        &self,
        hash_key: &str,
        range_key: Option<&str>,
        filter: Option<&Condition>,
        window: Option<Window>,
    ) -> Result<Vec<I>> {
        self.record::<I>("index_query");
        self.inner.index_query(hash_key, range_key, filter, window)
    }

    fn save<I: Item>(&self, item: &I) -> Result<()> {
        self.record::<I>("save");
        self.inner.save(item)
    }

    fn update<I: Item>(&self, key: &ItemKey, changes: &ChangeSet) -> Result<()> {
        self.record::<I>("update");
        self.inner.update::<I>(key, changes)
    }

    fn delete<I: Item>(&self, key: &ItemKey) -> Result<()> {
        self.record::<I>("delete");
        self.inner.delete::<I>(key)
    }
}
