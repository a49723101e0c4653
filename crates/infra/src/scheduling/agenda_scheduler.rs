//! Cron-driven scheduler for agenda background work.
//!
//! A single [`JobScheduler`] hosts every agenda job, each on its own cron
//! expression. Jobs are registered when the scheduler starts, so a stopped
//! scheduler can be started again. Stopping cancels any run still in flight.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use almanac_infra::errors::InfraError;
//! use almanac_infra::scheduling::{AgendaJob, AgendaScheduler, AgendaSchedulerConfig, SchedulerResult};
//!
//! struct NoopJob;
//!
//! #[async_trait]
//! impl AgendaJob for NoopJob {
//!     fn name(&self) -> &'static str {
//!         "noop"
//!     }
//!
//!     async fn run(&self) -> Result<(), InfraError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> SchedulerResult<()> {
//! let mut scheduler = AgendaScheduler::new(AgendaSchedulerConfig::default())
//!     .with_job("*/30 * * * * *", Arc::new(NoopJob));
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::InfraError;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// A unit of background work run on every tick of its cron expression.
#[async_trait]
pub trait AgendaJob: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<(), InfraError>;
}

/// Timeouts shared by every job of a scheduler.
#[derive(Debug, Clone)]
pub struct AgendaSchedulerConfig {
    /// Upper bound for a single job run.
    pub job_timeout: Duration,
    /// Upper bound for starting or shutting down the underlying scheduler.
    pub lifecycle_timeout: Duration,
}

impl Default for AgendaSchedulerConfig {
    fn default() -> Self {
        Self { job_timeout: Duration::from_secs(60), lifecycle_timeout: Duration::from_secs(5) }
    }
}

struct Registration {
    cron: String,
    job: Arc<dyn AgendaJob>,
}

/// State that only exists between `start` and `stop`.
struct Running {
    scheduler: JobScheduler,
    job_ids: Vec<(&'static str, Uuid)>,
    cancellation: CancellationToken,
}

/// Runs the agenda jobs until stopped.
pub struct AgendaScheduler {
    config: AgendaSchedulerConfig,
    registrations: Vec<Registration>,
    running: Option<Running>,
}

impl AgendaScheduler {
    pub fn new(config: AgendaSchedulerConfig) -> Self {
        Self { config, registrations: Vec::new(), running: None }
    }

    /// Add a job on a six-field cron expression. Takes effect on the next start.
    pub fn with_job(mut self, cron: impl Into<String>, job: Arc<dyn AgendaJob>) -> Self {
        self.registrations.push(Registration { cron: cron.into(), job });
        self
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|registration| registration.job.name()).collect()
    }

    /// Scheduler ids of the jobs in the current run; empty when stopped.
    pub fn job_ids(&self) -> Vec<(&'static str, Uuid)> {
        self.running.as_ref().map(|running| running.job_ids.clone()).unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Register every job on a fresh scheduler and start it.
    #[instrument(skip(self), fields(jobs = self.registrations.len()))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;
        let cancellation = CancellationToken::new();

        let mut job_ids = Vec::with_capacity(self.registrations.len());
        for registration in &self.registrations {
            let job = self.build_job(registration, cancellation.clone())?;
            let job_id = scheduler
                .add(job)
                .await
                .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;
            debug!(job = registration.job.name(), cron = %registration.cron, %job_id, "Registered agenda job");
            job_ids.push((registration.job.name(), job_id));
        }

        let timeout = self.config.lifecycle_timeout;
        tokio::time::timeout(timeout, scheduler.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        info!(jobs = ?self.job_names(), "Agenda scheduler started");
        self.running = Some(Running { scheduler, job_ids, cancellation });
        Ok(())
    }

    /// Cancel in-flight runs and shut the scheduler down.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut running) = self.running.take() else {
            return Err(SchedulerError::NotRunning);
        };

        running.cancellation.cancel();

        let timeout = self.config.lifecycle_timeout;
        tokio::time::timeout(timeout, running.scheduler.shutdown())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: timeout, source })?
            .map_err(|source| SchedulerError::StopFailed { source })?;

        info!("Agenda scheduler stopped");
        Ok(())
    }

    fn build_job(
        &self,
        registration: &Registration,
        cancellation: CancellationToken,
    ) -> SchedulerResult<Job> {
        let job = Arc::clone(&registration.job);
        let timeout = self.config.job_timeout;

        Job::new_async(registration.cron.as_str(), move |_id, _scheduler| {
            let job = Arc::clone(&job);
            let cancellation = cancellation.clone();
            Box::pin(async move { run_once(job.as_ref(), timeout, &cancellation).await })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })
    }
}

async fn run_once(job: &dyn AgendaJob, timeout: Duration, cancellation: &CancellationToken) {
    let name = job.name();
    if cancellation.is_cancelled() {
        return;
    }

    let started = Instant::now();
    tokio::select! {
        () = cancellation.cancelled() => {
            debug!(job = name, "Agenda job abandoned on shutdown");
        }
        outcome = tokio::time::timeout(timeout, job.run()) => match outcome {
            Ok(Ok(())) => {
                debug!(job = name, elapsed_ms = started.elapsed().as_millis(), "Agenda job finished");
            }
            Ok(Err(err)) => error!(job = name, error = %err, "Agenda job failed"),
            Err(_) => warn!(job = name, timeout_secs = timeout.as_secs(), "Agenda job timed out"),
        },
    }
}

impl Drop for AgendaScheduler {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            warn!("AgendaScheduler dropped while running; cancelling jobs");
            running.cancellation.cancel();
        }
    }
}
