use axum::{
    routing::{get, post},
    Router,
};
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::handlers;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the content API.
///
/// Initializes tracing, configuration, the database pool and the response
/// cache, then serves the content and dropdown routes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "content_doctor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url, config.max_connections).await?;
    tracing::info!("Database connection pool established");

    // Response cache, cleared on demand through /api/cache/clear
    let response_cache = Cache::builder()
        .time_to_live(Duration::from_secs(config.cache_ttl_secs))
        .max_capacity(10_000)
        .build();
    tracing::info!(
        "Dropdowns served from {}",
        if config.use_jsonb_dropdowns {
            "dropdown_configs"
        } else {
            "legacy content rows"
        }
    );
    tracing::info!(
        "Response cache initialized ({}s TTL, 10k capacity)",
        config.cache_ttl_secs
    );

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        store: ContentStore::new(db.pool.clone()),
        config: config.clone(),
        response_cache,
    });

    let api_routes = Router::new()
        .route(
            "/api/content/:screen/:language",
            get(handlers::get_content),
        )
        .route(
            "/api/dropdowns/:screen/:language",
            get(handlers::get_dropdowns),
        )
        .route("/api/cache/clear", post(handlers::clear_cache))
        .route(
            "/api/feature-flags/dropdown-system",
            get(handlers::dropdown_feature_flags),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB, requests carry no meaningful body
                .layer(RequestBodyLimitLayer::new(1024 * 1024)),
        );

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
