use log::info;

use crate::app::controller::AppController;
use crate::config::load_config;
use crate::error::{Context, Result};

/// Entry point used by `main`: load configuration, then hand over to the controller.
pub async fn run() -> Result<()> {
    let root = std::env::current_dir().context("Failed to resolve the working directory")?;
    let config = load_config(&root)?;
    info!("using analytics service at {}", config.api.base_url);

    let controller = AppController::new(config)?;
    controller.run().await
}
