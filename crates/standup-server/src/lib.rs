pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod expiry;

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{Database, UpdateStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UpdateStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn UpdateStore>) -> Self {
        Self { store }
    }
}

/// Build the application router, serving client assets from `static_dir`
/// for any path the API does not handle. Paths without a matching file get
/// `index.html` so client-side routes survive a reload.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .merge(api::router())
        .method_not_allowed_fallback(api::method_not_allowed);
    if let Some(dir) = static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Run the server with the given configuration
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    // Initialize database
    let db = Database::connect(
        &config.database_url,
        config.max_connections,
        config.record_ttl(),
    )
    .await?;
    tracing::info!("Connected to database");

    // Run migrations
    db.migrate().await?;

    let store: Arc<dyn UpdateStore> = Arc::new(db);

    if let Some(period) = config.sweep_interval() {
        expiry::spawn_sweeper(Arc::clone(&store), period);
    }

    let app = app(AppState::new(store), config.static_dir.as_deref());

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
