//! Configuration structures
//!
//! Every section has defaults so partial config files are accepted.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_HIGHLIGHT_COLORS, DEFAULT_MAINTENANCE_CRON,
    DEFAULT_REMINDER_CRON, DEFAULT_REMINDER_GRACE_MINUTES,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agenda: AgendaConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database location and pool sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Agenda cache tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Size of the highlight color palette
    #[serde(default = "default_highlight_colors")]
    pub highlight_colors: usize,
    /// Reminders older than this are dropped without notification
    #[serde(default = "default_grace_minutes")]
    pub reminder_grace_minutes: i64,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            highlight_colors: DEFAULT_HIGHLIGHT_COLORS,
            reminder_grace_minutes: DEFAULT_REMINDER_GRACE_MINUTES,
        }
    }
}

/// Background job schedules (six-field cron expressions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reminder_cron")]
    pub reminder_cron: String,
    #[serde(default = "default_maintenance_cron")]
    pub maintenance_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_cron: DEFAULT_REMINDER_CRON.to_string(),
            maintenance_cron: DEFAULT_MAINTENANCE_CRON.to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::Pretty }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_highlight_colors() -> usize {
    DEFAULT_HIGHLIGHT_COLORS
}

fn default_grace_minutes() -> i64 {
    DEFAULT_REMINDER_GRACE_MINUTES
}

fn default_true() -> bool {
    true
}

fn default_reminder_cron() -> String {
    DEFAULT_REMINDER_CRON.to_string()
}

fn default_maintenance_cron() -> String {
    DEFAULT_MAINTENANCE_CRON.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
