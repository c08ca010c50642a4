//! Process-wide cache of built schemas, keyed by function name

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::EngineSchema;

#[derive(Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<String, EngineSchema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema for `name`, building it on first use.
    pub fn get_or_build(&self, name: &str, build: impl FnOnce() -> EngineSchema) -> EngineSchema {
        let mut schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = schemas.get(name) {
            return schema.clone();
        }

        tracing::info!("Building schema {}", name);
        let schema = build();
        schemas.insert(name.to_string(), schema.clone());
        schema
    }

    /// Drop one schema so the next request rebuilds it.
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self
            .schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            tracing::debug!("Invalidated schema {}", name);
        }
        removed
    }

    pub fn clear(&self) {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{build_schema, FUNCTION_NAME};
    use crate::retry::RetryPolicy;
    use crate::service::Engine;
    use crate::storage::SqliteStore;
    use std::cell::Cell;
    use std::sync::Arc;

    fn schema() -> EngineSchema {
        let store = SqliteStore::open_in_memory().unwrap();
        build_schema(Arc::new(Engine::new(Arc::new(store)).with_retry(RetryPolicy::immediate(1))))
    }

    #[test]
    fn test_builds_once_per_key() {
        let cache = SchemaCache::new();
        let builds = Cell::new(0);

        for _ in 0..3 {
            cache.get_or_build(FUNCTION_NAME, || {
                builds.set(builds.get() + 1);
                schema()
            });
        }

        assert_eq!(builds.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = SchemaCache::new();
        cache.get_or_build(FUNCTION_NAME, schema);

        assert!(cache.invalidate(FUNCTION_NAME));
        assert!(!cache.invalidate(FUNCTION_NAME));
        assert!(cache.is_empty());

        cache.get_or_build(FUNCTION_NAME, schema);
        cache.get_or_build("other", schema);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
