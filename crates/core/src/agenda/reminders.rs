//! Reminder sweep
//!
//! A periodic tick walks the agenda and fires reminders whose time has come.
//! Reminders that are due but older than the grace window are cleared
//! silently: delivery is best-effort, and a cleared reminder never fires
//! again for the same occurrence.

use almanac_domain::{RecordId, Timestamp};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use super::entry::AgendaEntry;
use super::ports::ReminderSink;

/// Which reminder of an occurrence fell due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Prep,
    Start,
}

/// A reminder handed to the [`ReminderSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueReminder {
    pub record_id: RecordId,
    pub title: String,
    pub kind: ReminderKind,
    pub due_at: Timestamp,
    pub occurrence_at: Timestamp,
}

/// Fire or clear due reminders; returns how many were delivered.
pub(crate) fn sweep(
    entries: &mut [AgendaEntry],
    now: NaiveDateTime,
    grace: Duration,
    sink: &dyn ReminderSink,
) -> usize {
    let now_ts = Timestamp::new(now);
    let oldest_deliverable = Timestamp::new(now.checked_sub_signed(grace).unwrap_or(now));
    let mut delivered = 0;

    for entry in entries.iter_mut() {
        if entry.reminders.is_empty() {
            continue;
        }

        let occurrence_at = entry.at();
        let record_id = entry.record_id();
        let title = entry.record().title.clone();
        let slots = [
            (ReminderKind::Prep, &mut entry.reminders.prep_at),
            (ReminderKind::Start, &mut entry.reminders.start_at),
        ];

        for (kind, slot) in slots {
            let Some(due_at) = *slot else {
                continue;
            };
            if due_at > now_ts {
                continue;
            }
            *slot = None;

            if due_at < oldest_deliverable {
                debug!(record_id, ?kind, due_at = %due_at, "dropping stale reminder");
                continue;
            }

            sink.deliver(&DueReminder {
                record_id,
                title: title.clone(),
                kind,
                due_at,
                occurrence_at,
            });
            delivered += 1;
        }
    }

    delivered
}
