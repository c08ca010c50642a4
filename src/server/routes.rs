use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;
use crate::storage::DbStats;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Single entry point for every query and mutation.
pub async fn graphql(
    State(state): State<Arc<AppState>>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let schema = state.schema();
    let response = schema.execute(request).await;
    if response.is_err() {
        tracing::warn!("GraphQL request returned {} error(s)", response.errors.len());
    }
    Json(response)
}

pub async fn schema(State(state): State<Arc<AppState>>) -> String {
    state.schema().sdl()
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DbStats>, (StatusCode, Json<ErrorResponse>)> {
    let stats = state
        .engine
        .store()
        .stats()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() })))?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::SchemaCache;
    use crate::retry::RetryPolicy;
    use crate::service::Engine;
    use crate::storage::SqliteStore;

    fn state() -> Arc<AppState> {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = Engine::new(Arc::new(store)).with_retry(RetryPolicy::immediate(1));
        Arc::new(AppState::new(Arc::new(engine), Arc::new(SchemaCache::new())))
    }

    #[tokio::test]
    async fn test_graphql_handler_uses_cached_schema() {
        let state = state();
        let request = async_graphql::Request::new("{ ping }");

        let Json(response) = graphql(State(state.clone()), Json(request)).await;
        assert!(response.errors.is_empty());
        assert_eq!(state.schemas.len(), 1);

        let sdl = schema(State(state.clone())).await;
        assert!(sdl.contains("insertUpdateApp"));
        assert_eq!(state.schemas.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let Json(stats) = stats(State(state())).await.ok().unwrap();
        assert_eq!(stats, DbStats { apps: 0, app_configs: 0, threads: 0 });
    }
}
