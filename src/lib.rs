//! Item Shop Watch - item shop query bot and change notifier
//!
//! Answers shop queries (full listing, lookups, filters, rankings, deals,
//! stats) against the live upstream catalog and pushes the whole catalog to
//! a configured channel whenever it changes.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::AppContext;
use crate::infrastructure::logging::{init_logging_with_config, log_system_info};
use crate::infrastructure::{ConfigManager, ConsoleGateway};

/// Load configuration, start logging and the poller, then serve console
/// commands until stdin closes or Ctrl-C arrives.
pub async fn run() -> Result<()> {
    let config_manager = ConfigManager::new()?;
    let config = config_manager.initialize_on_first_run().await?;

    init_logging_with_config(config.logging.clone())?;
    log_system_info();
    info!("⚙️ Configuration: {:?}", config_manager.config_path());

    let context = AppContext::from_config(config)?;
    let poller = context.start_poller().await;

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Ctrl-C received, shutting down");
                ctrl_c.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let gateway = ConsoleGateway::new(Arc::clone(&context.dispatcher), context.console_actor());
    info!("🛒 Ready. Type /help for commands.");
    let served = gateway
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
        .await;

    poller.stop().await;
    let served = served?;
    info!("✅ Shut down after {} console commands", served);
    Ok(())
}
