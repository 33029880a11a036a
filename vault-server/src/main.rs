//! vault-server: T-shirt collection catalog service
//!
//! Long-running service that:
//! - Serves the catalog, collection, profile and image JSON API
//! - Gates the app's pages on session + profile state
//! - Relays image uploads to the media host
//! - Pushes per-user change events over WebSocket

mod api;
mod auth;
mod config;
mod db;
mod error;
mod live;
mod media;
mod state;
mod util;

use std::net::SocketAddr;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vault_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting vault-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone()).layer(api::cors_layer(&config.public_base_url)?);

    // Periodic login throttle cleanup (every 5 minutes)
    let throttle = state.login_throttle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            throttle.cleanup().await;
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("vault-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
