//! Database implementations

pub mod manager;
pub mod record_repository;

pub use manager::*;
pub use record_repository::*;
