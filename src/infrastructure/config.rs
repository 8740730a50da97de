//! Configuration infrastructure
//!
//! Contains configuration loading and management for the item shop watcher.
//!
//! Configuration is organized into sections:
//! 1. Bot identity (owner, console operator)
//! 2. Upstream catalog API access
//! 3. Change poller schedule
//! 4. Notification delivery (webhooks per channel)
//! 5. Logging

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, Context};
use tokio::fs;
use tracing::{info, warn};

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub catalog: CatalogApiConfig,
    pub poller: PollerConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Who is who on the command surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// The single identity allowed to run owner-only commands
    pub owner_id: u64,

    /// Identity used for commands typed on the local console
    pub console_actor_id: u64,

    /// Whether the console operator has administrator permission
    pub console_actor_is_admin: bool,
}

/// Upstream catalog API access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogApiConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Upper bound on outgoing requests, shared by the poller and commands
    pub max_requests_per_second: u32,
}

/// Change poller schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_minutes: u64,

    /// Channel to arm the poller with on start, if any.
    /// The destination is otherwise only set by `setshopchannel`.
    pub initial_channel: Option<u64>,
}

/// Notification delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Channel id -> webhook URL
    pub webhooks: HashMap<u64, String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Offset from UTC used for log timestamps, in hours
    pub utc_offset_hours: i32,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            owner_id: defaults::OWNER_ID,
            console_actor_id: defaults::OWNER_ID,
            console_actor_is_admin: true,
        }
    }
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self {
            api_url: shop_api::SHOP_URL.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::POLL_INTERVAL_MINUTES,
            initial_channel: None,
        }
    }
}

impl PollerConfig {
    /// Poll interval; zero minutes is clamped to one
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            utc_offset_hours: 0,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters.insert("item_shop_watch_lib".to_string(), "info".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Create a configuration manager pointing at the user config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_path(config_dir.join(defaults::CONFIG_FILE_NAME)))
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Initialize configuration system on first run
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        if self.config_path.exists() {
            return self.load_config().await;
        }

        info!("🎉 First run detected - initializing default configuration");
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        info!("✅ Initial configuration setup completed");
        Ok(default_config)
    }

    /// Load configuration from file, creating default if it doesn't exist.
    /// A file that cannot be parsed is backed up and replaced by defaults.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path).await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config).await
                    .context("Failed to save default configuration")?;

                info!("✅ Reset to default configuration");
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content).await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Upstream item shop API
pub mod shop_api {
    /// Current shop endpoint; answers anonymously with `{ data: { entries } }`
    pub const SHOP_URL: &str = "https://fortnite-api.com/v2/shop";
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config / data directories
    pub const APP_DIR_NAME: &str = "item-shop-watch";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "item_shop_watch_config.json";

    /// Owner identity allowed to run `info`
    pub const OWNER_ID: u64 = 1_264_677_032_357_527_607;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Default user agent
    pub const USER_AGENT: &str = "item-shop-watch/0.2";

    /// Default outgoing request budget
    pub const MAX_REQUESTS_PER_SECOND: u32 = 2;

    /// Default poll interval in minutes
    pub const POLL_INTERVAL_MINUTES: u64 = 10;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Default log file name
    pub const LOG_FILE_NAME: &str = "item-shop-watch.log";

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    /// Default auto cleanup logs setting
    pub const LOG_AUTO_CLEANUP: bool = true;
}
