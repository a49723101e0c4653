//! Observability bootstrap

pub mod logging;

pub use logging::{build_filter, init_tracing};
