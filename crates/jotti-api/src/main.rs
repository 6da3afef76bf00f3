//! Jotti API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use jotti_core::clock::SystemClock;
use jotti_core::id::RandomIdGenerator;
use jotti_event_store::deadline_event_repository::DeadlineEventRepository;
use jotti_event_store::pg_event_repository::PgEventRepository;
use jotti_table::domain::schema::SchemaRegistry;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use jotti_api::config::Config;
use jotti_api::error::AppError;
use jotti_api::routes;
use jotti_api::state::AppState;
use jotti_api::telemetry;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Jotti API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let event_repository = DeadlineEventRepository::new(
        PgEventRepository::new(pool.clone()),
        config.store_timeout,
    );
    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(RandomIdGenerator),
        Arc::new(event_repository),
        SchemaRegistry::table_v1(),
    );

    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
