//! Eventboard - Community Event Listing Service
//! Mission: REST API for events, RSVPs, and user accounts

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventboard_backend::{
    api::{create_router, AppState},
    auth::{JwtHandler, UserStore},
    events::EventStore,
    models::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    // Both stores share one database file; each holds its own connection.
    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let event_store = Arc::new(EventStore::new(&config.database_path)?);
    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    let app = create_router(AppState {
        user_store,
        event_store,
        jwt_handler,
    });

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("🚀 Server started at http://localhost:{}", config.port);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventboard_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
