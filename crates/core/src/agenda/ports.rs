//! Port interfaces for the agenda
//!
//! These traits define the boundaries between the agenda cache and its
//! collaborators. The cache is driven synchronously from one logical thread,
//! so the ports are plain blocking traits.

use almanac_domain::{ChangeDescriptor, RecordId, Result, ScheduledRecord};
use chrono::{Local, NaiveDate, NaiveDateTime};

use super::reminders::DueReminder;

/// Trait for the persistent record store
pub trait RecordStore: Send + Sync {
    /// Records with a scheduled time that are not done
    fn load_scheduled(&self) -> Result<Vec<ScheduledRecord>>;

    /// Unscheduled, parentless, non-quick-capture records that are not done
    fn load_top_level_notes(&self) -> Result<Vec<ScheduledRecord>>;

    /// Mark many records done in one write; returns the number updated
    fn mark_done(&self, ids: &[RecordId], on: NaiveDate) -> Result<usize>;

    /// Insert or replace a record
    fn save(&self, record: &ScheduledRecord) -> Result<()>;
}

/// Trait notified after every incremental agenda update
pub trait AgendaObserver: Send + Sync {
    fn agenda_changed(&self, change: &ChangeDescriptor);
}

/// Trait receiving reminders that fell due inside the grace window
pub trait ReminderSink: Send + Sync {
    fn deliver(&self, reminder: &DueReminder);
}

/// Wall-clock source (local time, no timezone concept)
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Real local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
