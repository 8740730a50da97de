//! Infrastructure layer for the upstream API, notifications and ambient concerns
//!
//! This module provides configuration loading, logging setup, the rate limited
//! HTTP client, the shop wire format, the catalog fetcher, notification sinks
//! and the console command gateway.

pub mod catalog_fetcher;
pub mod config;
pub mod console;
pub mod http_client;
pub mod logging;
pub mod notify;
pub mod shop_api;

// Re-export commonly used items
pub use catalog_fetcher::CatalogFetcher;
pub use config::{AppConfig, ConfigManager};
pub use console::ConsoleGateway;
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{init_logging_with_config, get_log_directory};
pub use notify::{ConsoleSink, WebhookSink};
pub use shop_api::parse_catalog_document;
