// src/main.rs
use place_it_now::api;
use place_it_now::catalog::load_catalog;
use place_it_now::config::AppConfig;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let optimizer_config = app_config.optimizer.clone();
    let catalog = load_catalog(app_config.catalog.path());

    info!("🚀 Room planner starting...");
    if let Err(err) = api::start_api_server(api_config, optimizer_config, catalog).await {
        error!("❌ Server stopped: {}", err);
        std::process::exit(1);
    }
}
