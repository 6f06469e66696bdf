use std::sync::Arc;

use mileage::config::AppConfig;
use mileage::error::AppError;
use mileage::routes::create_router;
use mileage::services::{gemini::GeminiClient, store::FileStore};
use mileage::state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;

    let store = FileStore::new(config.data_dir.clone());
    store.ensure_structure().await?;

    let gemini = GeminiClient::new(config.gemini.clone());
    if !gemini.has_api_key() {
        warn!("API_KEY environment variable not set. Gemini API calls will fail.");
    }

    let state = AppState::open(config.clone(), Arc::new(store), Arc::new(gemini)).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,mileage=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
