//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Recurrence expansion ceilings
pub const MAX_PATTERN_ITERATIONS: usize = 500;
pub const MAX_WEEK_OF_MONTH_JUMPS: usize = 200;
pub const WEEKS_IN_MONTH_MASK: usize = 5;

// Rule horizon: default end bound and auto-extension floor, in months
pub const RULE_HORIZON_MONTHS: u32 = 12;

// Agenda highlighting
pub const DEFAULT_HIGHLIGHT_COLORS: usize = 8;

// Reminder delivery
pub const DEFAULT_REMINDER_GRACE_MINUTES: i64 = 15;
pub const DEFAULT_REMINDER_CRON: &str = "*/30 * * * * *";
pub const DEFAULT_MAINTENANCE_CRON: &str = "0 5 0 * * *";

// Database
pub const DEFAULT_DB_PATH: &str = "almanac.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
