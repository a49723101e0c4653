//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `ALMANAC_DB_PATH` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ALMANAC_DB_PATH`: Database file path (required for env loading)
//! - `ALMANAC_DB_POOL_SIZE`: Connection pool size
//! - `ALMANAC_HIGHLIGHT_COLORS`: Size of the highlight palette
//! - `ALMANAC_REMINDER_GRACE_MINUTES`: Reminder grace window
//! - `ALMANAC_SCHEDULER_ENABLED`: Whether background jobs run (true/false)
//! - `ALMANAC_REMINDER_CRON`: Cron expression for the reminder sweep
//! - `ALMANAC_MAINTENANCE_CRON`: Cron expression for auto-completion
//! - `ALMANAC_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `ALMANAC_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./almanac.toml` or `./almanac.json` (current working directory)
//! 3. `../config.{toml,json}` and `../../config.{toml,json}`
//! 4. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use almanac_domain::{
    AgendaConfig, AlmanacError, Config, DatabaseConfig, LogFormat, LoggingConfig, Result,
    SchedulerConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["config.toml", "config.json", "almanac.toml", "almanac.json"];
const PARENT_FILE_NAMES: [&str; 4] =
    ["../config.toml", "../config.json", "../../config.toml", "../../config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the database path
/// is not set there, falls back to a config file.
///
/// # Errors
/// Returns `AlmanacError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - An environment variable holds an invalid value
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to built-in defaults when no source exists.
///
/// Invalid values in a source that does exist are still reported.
pub fn load_or_default() -> Result<Config> {
    if std::env::var_os("ALMANAC_DB_PATH").is_none() && probe_config_paths().is_none() {
        tracing::info!("No configuration found, using defaults");
        return Ok(Config::default());
    }
    load()
}

/// Load configuration from environment variables
///
/// `ALMANAC_DB_PATH` must be present; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `AlmanacError::Config` if the database path is missing or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let database = DatabaseConfig {
        path: env_var("ALMANAC_DB_PATH")?,
        pool_size: env_parse("ALMANAC_DB_POOL_SIZE", defaults.database.pool_size)?,
    };

    let agenda = AgendaConfig {
        highlight_colors: env_parse("ALMANAC_HIGHLIGHT_COLORS", defaults.agenda.highlight_colors)?,
        reminder_grace_minutes: env_parse(
            "ALMANAC_REMINDER_GRACE_MINUTES",
            defaults.agenda.reminder_grace_minutes,
        )?,
    };

    let scheduler = SchedulerConfig {
        enabled: env_bool("ALMANAC_SCHEDULER_ENABLED", defaults.scheduler.enabled),
        reminder_cron: std::env::var("ALMANAC_REMINDER_CRON")
            .unwrap_or(defaults.scheduler.reminder_cron),
        maintenance_cron: std::env::var("ALMANAC_MAINTENANCE_CRON")
            .unwrap_or(defaults.scheduler.maintenance_cron),
    };

    let format = match std::env::var("ALMANAC_LOG_FORMAT") {
        Ok(raw) => parse_log_format(&raw)?,
        Err(_) => defaults.logging.format,
    };
    let logging = LoggingConfig {
        level: std::env::var("ALMANAC_LOG_LEVEL").unwrap_or(defaults.logging.level),
        format,
    };

    Ok(Config { database, agenda, scheduler, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AlmanacError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AlmanacError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AlmanacError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AlmanacError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AlmanacError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AlmanacError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AlmanacError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().chain(&PARENT_FILE_NAMES).map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(
                CONFIG_FILE_NAMES.iter().chain(&PARENT_FILE_NAMES).map(|name| exe_dir.join(name)),
            );
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| AlmanacError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable, using `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AlmanacError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(AlmanacError::Config(format!("Invalid log format: {other}"))),
    }
}
