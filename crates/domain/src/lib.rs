//! # Almanac Domain
//!
//! Business domain types and models for Almanac.
//!
//! This crate contains:
//! - Record types consumed by the agenda (ScheduledRecord, visibility, etc.)
//! - The canonical `YYYYMMDDHHMM` timestamp and compact duration parsing
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Almanac crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::duration::{parse_compact_duration, DurationParseError};
