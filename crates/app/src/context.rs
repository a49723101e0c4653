//! Application context - dependency injection container

use std::sync::Arc;

use almanac_core::{AgendaCache, Clock, SystemClock};
use almanac_domain::{Config, Result};
use almanac_infra::scheduling::{
    share, AgendaScheduler, AgendaSchedulerConfig, AutoCompleteJob, ReminderSweepJob, SharedAgenda,
};
use almanac_infra::{DbManager, SqliteRecordStore};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::adapters::{LogReminderSink, LoggingObserver};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub agenda: SharedAgenda,
    clock: Arc<dyn Clock>,
    scheduler: Option<AgendaScheduler>,
}

impl AppContext {
    /// Open the database, load the agenda and prepare background jobs.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;
        db.health_check()?;

        let store = Arc::new(SqliteRecordStore::new(db));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = AgendaCache::open(store, Arc::clone(&clock), config.agenda.clone())?
            .with_observer(Arc::new(LoggingObserver));
        let agenda = share(cache);

        let scheduler = if config.scheduler.enabled {
            Some(create_scheduler(&config, &agenda))
        } else {
            info!("Background jobs disabled by configuration");
            None
        };

        Ok(Self { config, agenda, clock, scheduler })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Start the background jobs.
    pub async fn start(&mut self) -> Result<()> {
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.start().await?;
        }
        Ok(())
    }

    /// Stop background jobs, logging (not propagating) failures.
    pub async fn shutdown(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut().filter(|scheduler| scheduler.is_running()) {
            if let Err(err) = scheduler.stop().await {
                warn!(error = %err, "Failed to stop scheduler cleanly");
            }
        }
        info!("Almanac stopped");
    }
}

fn create_scheduler(config: &Config, agenda: &SharedAgenda) -> AgendaScheduler {
    let reminders = ReminderSweepJob::new(Arc::clone(agenda), Arc::new(LogReminderSink));
    let maintenance = AutoCompleteJob::new(Arc::clone(agenda));

    AgendaScheduler::new(AgendaSchedulerConfig::default())
        .with_job(config.scheduler.reminder_cron.clone(), Arc::new(reminders))
        .with_job(config.scheduler.maintenance_cron.clone(), Arc::new(maintenance))
}
