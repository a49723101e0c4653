//! # Almanac Infrastructure
//!
//! Infrastructure implementations of core agenda ports.
//!
//! This crate contains:
//! - SQLite record store (rusqlite on an r2d2 pool)
//! - Configuration loading from environment and files
//! - Cron-driven background jobs for the agenda cache
//! - Logging bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `almanac-core`
//! - Depends on `almanac-domain` and `almanac-core`
//! - Contains all "impure" code (I/O, timers, subscribers)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use observability::init_tracing;
pub use scheduling::{AgendaJob, AgendaScheduler, AgendaSchedulerConfig};
