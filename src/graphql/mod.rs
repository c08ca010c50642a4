//! GraphQL schema - one resolver per query or mutation, backed by the engine

pub mod cache;
pub mod mutation;
pub mod query;
pub mod types;

pub use cache::SchemaCache;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use crate::service::Engine;
use crate::storage::SqliteStore;

/// Cache key of the served schema.
pub const FUNCTION_NAME: &str = "app_core_engine_graphql";

pub type SharedEngine = Arc<Engine<SqliteStore>>;

pub type EngineSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(engine: SharedEngine) -> EngineSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(engine)
        .finish()
}

/// Schema definition language of the served schema.
pub fn sdl() -> anyhow::Result<String> {
    let store = SqliteStore::open_in_memory()?;
    Ok(build_schema(Arc::new(Engine::new(Arc::new(store)))).sdl())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdl_names_every_operation() {
        let sdl = sdl().unwrap();
        for field in [
            "ping",
            "appList",
            "appConfigList",
            "threadList",
            "insertUpdateApp",
            "deleteAppConfig",
            "insertThread",
            "deleteThread",
        ] {
            assert!(sdl.contains(field), "missing {}", field);
        }
    }
}
