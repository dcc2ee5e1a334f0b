use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use boba_map::{AppState, BobaConfig, logging, web};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // optional first argument: config file path
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = BobaConfig::load_from_path(config_path)?;
    logging::init(&config.logging)?;

    info!("Starting boba-map {}", boba_map::VERSION);
    let state = AppState::from_config(config)?;
    info!(places = state.catalogue.len(), "Catalogue loaded");

    web::run(Arc::new(state)).await
}
