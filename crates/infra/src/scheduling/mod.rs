//! Scheduling infrastructure for agenda background work
//!
//! One cron-driven scheduler runs the periodic agenda jobs:
//! - Reminder sweep (every 30 seconds by default)
//! - Auto-completion of overdue low-importance records (daily)
//!
//! The scheduler has an explicit start/stop lifecycle, cancels in-flight
//! runs on stop and wraps async steps in timeouts.

pub mod agenda_scheduler;
pub mod error;
pub mod jobs;

pub use agenda_scheduler::{AgendaJob, AgendaScheduler, AgendaSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
pub use jobs::{share, AutoCompleteJob, ReminderSweepJob, SharedAgenda};
