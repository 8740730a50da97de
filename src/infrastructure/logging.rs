//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - File logging with rotation of the previous run's file on startup
//! - Configuration file based log level control
//! - Structured JSON logging (optional)
//! - Console and file output support
//! - Timestamps in a configurable fixed UTC offset

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;
use crate::infrastructure::config::defaults;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Time formatter for a fixed offset from UTC
#[derive(Debug, Clone, Copy)]
struct OffsetTimeFormatter {
    offset: FixedOffset,
}

impl OffsetTimeFormatter {
    fn new(utc_offset_hours: i32) -> Self {
        Self {
            offset: fixed_offset(utc_offset_hours),
        }
    }
}

impl FormatTime for OffsetTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&self.offset);
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Out-of-range offsets fall back to UTC
fn fixed_offset(utc_offset_hours: i32) -> FixedOffset {
    utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Get the log directory: `<data dir>/item-shop-watch/logs`, or `logs/`
/// next to the executable when no data directory is known
pub fn get_log_directory() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join(defaults::APP_DIR_NAME).join("logs");
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Rename the previous run's log file to `<stem>.<timestamp>.log`
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str, offset: FixedOffset) -> Result<Option<PathBuf>> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(None);
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;

    let file_time = metadata.modified()
        .or_else(|_| metadata.created())
        .unwrap_or_else(|_| std::time::SystemTime::now());

    let datetime: chrono::DateTime<Utc> = file_time.into();
    let local = datetime.with_timezone(&offset);

    let file_stem = log_file_name.trim_end_matches(".log");
    let timestamped_name = format!("{}.{}.log", file_stem, local.format("%Y%m%dT%H%M%S"));
    let timestamped_path = log_dir.join(&timestamped_name);

    std::fs::rename(&log_file_path, &timestamped_path)
        .map_err(|e| anyhow!("Failed to rotate log file {} to {}: {}",
            log_file_path.display(), timestamped_path.display(), e))?;

    Ok(Some(timestamped_path))
}

/// Build the filter from `RUST_LOG` when set, otherwise from the configured
/// level plus per-module directives. Dependency noise is only let through
/// at TRACE.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if config.level.to_lowercase().contains("trace") {
        return Ok(filter);
    }

    let mut directives: Vec<String> = config.module_filters
        .iter()
        .map(|(module, level)| format!("{}={}", module, level))
        .collect();
    directives.sort();

    for directive in directives {
        let parsed = directive.parse()
            .map_err(|e| anyhow!("Invalid log directive '{}': {}", directive, e))?;
        filter = filter.add_directive(parsed);
    }

    Ok(filter)
}

fn file_layer(config: &LoggingConfig, writer: non_blocking::NonBlocking, timer: OffsetTimeFormatter) -> BoxedLayer {
    if config.json_format {
        fmt::Layer::new()
            .json()
            .with_writer(writer)
            .with_timer(timer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .boxed()
    } else {
        // time + level + message only
        fmt::Layer::new()
            .with_writer(writer)
            .with_timer(timer)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false)
            .boxed()
    }
}

fn console_layer(timer: OffsetTimeFormatter) -> BoxedLayer {
    // stderr keeps stdout free for console command output
    fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_timer(timer)
        .with_target(false)
        .boxed()
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// `RUST_LOG` replaces the configured level and module filters entirely:
/// ```bash
/// # Show detailed HTTP logs
/// RUST_LOG="debug,reqwest=debug,hyper=debug" item-shop-watch
/// ```
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let timer = OffsetTimeFormatter::new(config.utc_offset_hours);
    let log_dir = get_log_directory();
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut rotated = None;

    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        rotated = rotate_existing_log_file(&log_dir, &config.file_name, timer.offset)?;

        let file_appender = rolling::never(&log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);

        // Store the guard globally to prevent it from being dropped
        LOG_GUARDS.lock()
            .map_err(|_| anyhow!("Log guard store is poisoned"))?
            .push(file_guard);

        layers.push(file_layer(&config, file_writer, timer));
    }

    if config.console_output {
        layers.push(console_layer(timer));
    }

    Registry::default()
        .with(layers)
        .with(build_env_filter(&config)?)
        .try_init()
        .map_err(|e| anyhow!("Failed to install global subscriber: {}", e))?;

    info!("📝 Logging system initialized");
    info!("Log level: {}", config.level);
    info!("JSON format: {}", config.json_format);
    info!("Console output: {}", config.console_output);
    info!("File output: {}", config.file_output);

    if config.file_output {
        info!("Log directory: {:?}", log_dir);
        if let Some(path) = rotated {
            info!("Rotated previous log file to: {:?}", path);
        }
        if config.auto_cleanup_logs {
            let removed = cleanup_old_logs(&log_dir, config.max_files)?;
            if removed > 0 {
                info!("🧹 Removed {} old log files (keeping {})", removed, config.max_files);
            }
        }
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Item Shop Watch System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }

    info!("==========================================");
}

/// Delete the oldest `.log` files so that at most `max_files` remain.
/// Returns how many files were removed.
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path.is_file()
            && path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".log"));
        if !is_log {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            removed += 1;
        }
    }

    Ok(removed)
}
