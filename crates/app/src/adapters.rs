//! Host-side implementations of the agenda observer and reminder sink

use almanac_core::{AgendaObserver, DueReminder, ReminderKind, ReminderSink};
use almanac_domain::ChangeDescriptor;
use tracing::{debug, info};

/// Logs every incremental agenda change.
pub struct LoggingObserver;

impl AgendaObserver for LoggingObserver {
    fn agenda_changed(&self, change: &ChangeDescriptor) {
        debug!(
            schedule_changed = change.schedule_changed,
            parent_changed = change.parent_changed,
            "agenda changed"
        );
    }
}

/// Surfaces reminders as log events.
pub struct LogReminderSink;

impl ReminderSink for LogReminderSink {
    fn deliver(&self, reminder: &DueReminder) {
        let what = match reminder.kind {
            ReminderKind::Prep => "get ready for",
            ReminderKind::Start => "starting now:",
        };
        info!(
            record_id = reminder.record_id,
            occurrence_at = %reminder.occurrence_at,
            "reminder: {what} {}",
            reminder.title
        );
    }
}
