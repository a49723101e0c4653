//! Agenda entries: one projected occurrence plus transient scheduling state

use std::sync::Arc;

use almanac_domain::{RecordId, ScheduledRecord, Timestamp};

use crate::recurrence::PendingReminders;

/// One occurrence of a scheduled record on the agenda
///
/// Reminder and highlight fields are owned by the cache and only mutated by
/// the reminder sweep and the highlight pass.
#[derive(Debug, Clone)]
pub struct AgendaEntry {
    record: Arc<ScheduledRecord>,
    at: Timestamp,
    pub(crate) reminders: PendingReminders,
    pub(crate) color: Option<usize>,
    pub(crate) highlight_until: Option<Timestamp>,
}

impl AgendaEntry {
    pub(crate) fn new(record: Arc<ScheduledRecord>, at: Timestamp, reminders: PendingReminders) -> Self {
        Self { record, at, reminders, color: None, highlight_until: None }
    }

    pub fn record(&self) -> &ScheduledRecord {
        &self.record
    }

    pub fn record_id(&self) -> RecordId {
        self.record.id
    }

    pub fn at(&self) -> Timestamp {
        self.at
    }

    /// Whether this is the record's own scheduled instant rather than a repeat.
    pub fn is_current_instance(&self) -> bool {
        self.record.scheduled_at == Some(self.at)
    }

    pub fn pending_reminders(&self) -> PendingReminders {
        self.reminders
    }

    /// Highlight color slot, if the entry is highlighted.
    pub fn color(&self) -> Option<usize> {
        self.color
    }

    pub fn highlight_until(&self) -> Option<Timestamp> {
        self.highlight_until
    }
}
