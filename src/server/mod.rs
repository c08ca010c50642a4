use axum::{
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ui::Icons;
use crate::graphql::{build_schema, EngineSchema, SchemaCache, SharedEngine, FUNCTION_NAME};

pub mod routes;

/// Server state
pub struct AppState {
    pub engine: SharedEngine,
    pub schemas: Arc<SchemaCache>,
}

impl AppState {
    pub fn new(engine: SharedEngine, schemas: Arc<SchemaCache>) -> Self {
        Self { engine, schemas }
    }

    /// The served schema, built on first request.
    pub fn schema(&self) -> EngineSchema {
        self.schemas
            .get_or_build(FUNCTION_NAME, || build_schema(self.engine.clone()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/graphql", post(routes::graphql))
        .route("/schema", get(routes::schema))
        .route("/stats", get(routes::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(bind: IpAddr, port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let addr = SocketAddr::new(bind, port);
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}/graphql", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
