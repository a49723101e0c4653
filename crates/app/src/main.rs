//! Almanac - recurring agenda service
//!
//! Loads the agenda from the record store, prints the coming week and keeps
//! reminder and maintenance jobs running until Ctrl-C.

mod adapters;
mod context;
mod view;

use almanac_infra::{config, init_tracing};
use anyhow::Context;
use tracing::{info, warn};

use crate::context::AppContext;

const UPCOMING_DAYS: i64 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration from the environment
    let dotenv = dotenvy::dotenv();

    let config = config::load_or_default().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    let mut ctx = AppContext::new(config).context("failed to build application context")?;

    {
        let cache = ctx.agenda.lock();
        println!("{}", view::render_upcoming(&cache, ctx.today(), UPCOMING_DAYS));
    }

    ctx.start().await.context("failed to start schedulers")?;
    info!(
        db_path = %ctx.config.database.path,
        jobs = ctx.config.scheduler.enabled,
        "Almanac running; press Ctrl-C to exit"
    );

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    ctx.shutdown().await;
    Ok(())
}
