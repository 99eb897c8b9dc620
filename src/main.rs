use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use turn_ui_integration::{config::AppConfig, routes, state::AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("turn_ui_integration=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let address = config.address;
    let kind = config.kind;

    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Loaded {} calling codes", state.countries.len());

    let app = routes::create_router(kind).with_state(state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!("🚀 Turn {kind:?} integration running at http://{address}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
