//! Agenda jobs driven by [`AgendaScheduler`](super::AgendaScheduler)
//!
//! Both jobs lock the shared cache for the whole operation and run on the
//! blocking pool, since auto-completion writes to SQLite.

use std::sync::Arc;

use almanac_core::{AgendaCache, ReminderSink};
use almanac_domain::{AlmanacError, Result as DomainResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task;
use tracing::{debug, info};

use super::agenda_scheduler::AgendaJob;
use crate::errors::InfraError;

/// Agenda cache shared between the host and background jobs.
pub type SharedAgenda = Arc<Mutex<AgendaCache>>;

/// Wrap a loaded cache for sharing.
pub fn share(cache: AgendaCache) -> SharedAgenda {
    Arc::new(Mutex::new(cache))
}

/// Delivers due reminders on every tick.
pub struct ReminderSweepJob {
    cache: SharedAgenda,
    sink: Arc<dyn ReminderSink>,
}

impl ReminderSweepJob {
    pub fn new(cache: SharedAgenda, sink: Arc<dyn ReminderSink>) -> Self {
        Self { cache, sink }
    }
}

#[async_trait]
impl AgendaJob for ReminderSweepJob {
    fn name(&self) -> &'static str {
        "reminder_sweep"
    }

    async fn run(&self) -> Result<(), InfraError> {
        let cache = Arc::clone(&self.cache);
        let sink = Arc::clone(&self.sink);

        let delivered = run_blocking(move || {
            let mut cache = cache.lock();
            Ok(cache.sweep_reminders(sink.as_ref()))
        })
        .await?;
        if delivered > 0 {
            debug!(delivered, "reminders delivered");
        }
        Ok(())
    }
}

/// Daily maintenance: completes overdue low-importance records.
pub struct AutoCompleteJob {
    cache: SharedAgenda,
}

impl AutoCompleteJob {
    pub fn new(cache: SharedAgenda) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl AgendaJob for AutoCompleteJob {
    fn name(&self) -> &'static str {
        "auto_complete"
    }

    async fn run(&self) -> Result<(), InfraError> {
        let cache = Arc::clone(&self.cache);

        let completed = run_blocking(move || {
            let mut cache = cache.lock();
            cache.auto_complete_tasks()
        })
        .await?;
        info!(completed, "maintenance sweep finished");
        Ok(())
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, InfraError>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| InfraError(AlmanacError::Internal(format!("agenda job panicked: {err}"))))?
        .map_err(InfraError::from)
}
