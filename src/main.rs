//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the database
//! - Starts the HTTP server with graceful shutdown support

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use movie_catalog::config::Config;
use movie_catalog::database::{init_db, AppState};
use movie_catalog::route::create_app;

/// Application entry point
///
/// See [`Config::from_env`] for the environment variables read at startup.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_catalog=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    if config.admin_token.is_none() {
        tracing::warn!("AUTHORIZATION is not set, admin endpoints are unprotected");
    }
    if config.shortener.base_url.is_empty() {
        tracing::warn!("SHORTENER_BASE_URL is not set, short links will mirror the original urls");
    }

    let db = init_db(&config.database_path).expect("Failed to initialize database");

    let port = config.port;
    let db_name = config.database_path.clone();
    let state = AppState::new(db, config);

    let app = create_app(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind listener");

    tracing::info!(port, database = %db_name, "server running at http://localhost:{}", port);

    // The server will continue running until it receives SIGTERM or SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received
///
/// Open connections are allowed to complete so that in-flight database
/// writes are not cut short.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
