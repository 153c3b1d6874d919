use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use socialauth::logging::{init_tracing, shutdown_tracer};
use socialauth::metrics::{init_metrics, metrics_router};
use socialauth::router::init_router;
use socialauth::state::init_app_state;
use socialauth_config::AppConfig;
use socialauth_db::init_db_pool;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = ?e, "server failed");
        shutdown_tracer().await;
        std::process::exit(1);
    }

    shutdown_tracer().await;
}

async fn run() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let app_config = AppConfig::from_env();
    let state = init_app_state(pool);

    let mut app = init_router(state);
    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_router(handle));
    }

    let listener = tokio::net::TcpListener::bind(&app_config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", app_config.server_addr))?;

    info!("Server running on http://{}", app_config.server_addr);
    info!("Swagger UI available at {}/swagger-ui", app_config.base_url);
    info!("Scalar UI available at {}/scalar", app_config.base_url);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
