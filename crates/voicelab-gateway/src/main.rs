//! VoiceLab demo gateway: mock text-to-speech API over the voicelab core service.
//! Default bind 127.0.0.1:8010; see `DemoConfig` for overrides.

mod handlers;
mod response;

use std::sync::Arc;

use handlers::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicelab_core::{DemoConfig, DemoService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DemoConfig::load()?;
    let addr = config.bind_addr();
    tracing::info!(
        version = voicelab_core::version(),
        storage = %config.storage_path,
        max_characters = config.max_characters,
        daily_generations = config.daily_generations,
        "starting VoiceLab demo gateway"
    );

    let state = Arc::new(AppState::new(DemoService::new(config)));
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
