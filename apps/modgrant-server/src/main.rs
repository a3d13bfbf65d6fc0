use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use modgrant_api::{api_router, AppState, AuthConfig, AuthLayer};
use modgrant_db::{bootstrap, run_migrations, DbPool};

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,modgrant_api=debug")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    tracing::info!(
        listen_addr = %config.listen_addr,
        seed_demo_data = config.seed_demo_data,
        "starting modgrant server"
    );

    // Create database pool
    let pool = DbPool::connect(&config.database_url, config.max_connections)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Database connection error: {e}");
            std::process::exit(1);
        });

    run_migrations(&pool).await.unwrap_or_else(|e| {
        eprintln!("Migration error: {e}");
        std::process::exit(1);
    });

    if config.seed_demo_data {
        bootstrap::seed_demo_data(&pool).await.unwrap_or_else(|e| {
            eprintln!("Seed error: {e}");
            std::process::exit(1);
        });
    }

    let state = AppState::new(pool.inner().clone());
    let auth = AuthLayer::new(Arc::new(AuthConfig {
        jwt_secret: config.jwt_secret,
        issuer: config.issuer,
    }));

    let app = api_router(state)
        .layer(auth)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Bind error: {e}");
            std::process::exit(1);
        });

    tracing::info!(listen_addr = %config.listen_addr, "modgrant server listening");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    });
}
