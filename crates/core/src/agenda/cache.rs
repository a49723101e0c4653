//! Agenda cache - core business logic
//!
//! Holds three lists: scheduled records, unscheduled top-level notes, and
//! the agenda itself (every projected occurrence, sorted ascending by
//! timestamp). All mutation goes through `&mut self`, so one exclusive
//! borrow (or one lock, in a threaded host) covers a whole operation.

use std::sync::Arc;

use almanac_domain::{
    AgendaConfig, AlmanacError, ChangeDescriptor, Importance, RecordId, Result, ScheduledRecord,
    Timestamp,
};
use chrono::Duration;
use tracing::{debug, info, instrument, warn};

use super::entry::AgendaEntry;
use super::highlight::assign_highlights;
use super::ports::{AgendaObserver, Clock, RecordStore, ReminderSink};
use super::reminders;
use crate::recurrence::{compute_reminders, next_occurrence_after, project, RecurrenceRule};

/// Result of completing one instance of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The series continues; the record now sits at its next instance
    Rescheduled(Timestamp),
    /// No further instance exists; the record is done
    Completed,
}

/// What was dropped when a record was removed from the cache
#[derive(Debug, Default, Clone, Copy)]
struct Removal {
    found: bool,
    highlighted: bool,
}

/// In-memory agenda built from the record store
pub struct AgendaCache {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    observer: Option<Arc<dyn AgendaObserver>>,
    config: AgendaConfig,
    scheduled: Vec<Arc<ScheduledRecord>>,
    notes: Vec<Arc<ScheduledRecord>>,
    agenda: Vec<AgendaEntry>,
}

impl AgendaCache {
    /// Create an empty cache; call [`AgendaCache::initialize`] to load it.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: AgendaConfig) -> Self {
        Self {
            store,
            clock,
            observer: None,
            config,
            scheduled: Vec::new(),
            notes: Vec::new(),
            agenda: Vec::new(),
        }
    }

    /// Create and load a cache in one step.
    pub fn open(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        config: AgendaConfig,
    ) -> Result<Self> {
        let mut cache = Self::new(store, clock, config);
        cache.initialize()?;
        Ok(cache)
    }

    /// Register the observer notified after each incremental update.
    pub fn with_observer(mut self, observer: Arc<dyn AgendaObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Bulk-load both record lists and rebuild the agenda from scratch.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> Result<()> {
        let scheduled = self.store.load_scheduled()?;
        let notes = self.store.load_top_level_notes()?;

        self.scheduled.clear();
        self.notes.clear();
        self.agenda.clear();

        self.notes.extend(
            notes.into_iter().filter(ScheduledRecord::qualifies_as_top_level_note).map(Arc::new),
        );

        for record in scheduled {
            if record.qualifies_as_scheduled() {
                let record = Arc::new(record);
                let entries = self.expand(&record);
                self.agenda.extend(entries);
                self.scheduled.push(record);
            } else if record.qualifies_as_top_level_note() {
                warn!(record_id = record.id, "scheduled record has no usable time, keeping it as a note");
                if !self.notes.iter().any(|note| note.id == record.id) {
                    self.notes.push(Arc::new(record));
                }
            } else {
                warn!(record_id = record.id, "scheduled record has no usable time, leaving it off the agenda");
            }
        }

        self.sort_agenda();
        self.assign_highlights();
        self.sort_notes();

        info!(
            scheduled = self.scheduled.len(),
            notes = self.notes.len(),
            occurrences = self.agenda.len(),
            "agenda cache initialised"
        );
        Ok(())
    }

    /// Alias for [`AgendaCache::initialize`] used after external bulk changes.
    pub fn reload(&mut self) -> Result<()> {
        self.initialize()
    }

    /// Apply a saved record to the cache.
    ///
    /// Every prior trace of the record is removed, then it is re-admitted as
    /// a scheduled record or a top-level note if it still qualifies.
    /// Highlights are recomputed when the old or the new state is
    /// highlighted, and the observer is told about the change.
    #[instrument(skip(self, record), fields(record_id = record.id))]
    pub fn update_after_save(&mut self, record: ScheduledRecord, change: ChangeDescriptor) {
        let removal = self.remove_traces(record.id);
        let mut admits_highlight = false;

        if record.qualifies_as_scheduled() {
            let record = Arc::new(record);
            admits_highlight = record.is_highlighted();
            let entries = self.expand(&record);
            debug!(occurrences = entries.len(), "re-expanded scheduled record");
            self.agenda.extend(entries);
            self.scheduled.push(record);
            self.sort_agenda();
        } else if record.qualifies_as_top_level_note() {
            self.notes.push(Arc::new(record));
            self.sort_notes();
        }

        if removal.highlighted || admits_highlight {
            self.assign_highlights();
        }

        self.notify(&change);
    }

    /// Remove every trace of a record; `false` when it was not cached.
    pub fn forget(&mut self, id: RecordId) -> bool {
        let removal = self.remove_traces(id);
        if removal.highlighted {
            self.assign_highlights();
        }
        removal.found
    }

    /// Recolor every highlighted occurrence.
    pub fn assign_highlights(&mut self) {
        assign_highlights(&mut self.agenda, self.config.highlight_colors);
    }

    /// Mark every low-importance record scheduled before today as done.
    ///
    /// The store is updated in one batched write before the cache drops the
    /// records. Returns the number of records completed.
    #[instrument(skip(self))]
    pub fn auto_complete_tasks(&mut self) -> Result<usize> {
        let today = self.clock.today();
        let start_of_today = Timestamp::start_of(today);

        let stale: Vec<RecordId> = self
            .scheduled
            .iter()
            .filter(|record| record.importance == Importance::Low)
            .filter(|record| record.scheduled_at.is_some_and(|at| at < start_of_today))
            .map(|record| record.id)
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }

        let updated = self.store.mark_done(&stale, today)?;
        if updated != stale.len() {
            warn!(expected = stale.len(), updated, "store completed a different number of records");
        }

        let mut highlighted = false;
        for id in &stale {
            highlighted |= self.remove_traces(*id).highlighted;
        }
        if highlighted {
            self.assign_highlights();
        }

        info!(completed = stale.len(), "auto-completed overdue low-importance records");
        self.notify(&ChangeDescriptor::schedule());
        Ok(stale.len())
    }

    /// Complete the current instance of a record.
    ///
    /// A repeating record moves to its next instance; anything else (or an
    /// exhausted series) is marked done today. The change is persisted and
    /// applied to the cache.
    #[instrument(skip(self))]
    pub fn complete_instance(&mut self, id: RecordId) -> Result<CompletionOutcome> {
        let record = self
            .record(id)
            .cloned()
            .ok_or_else(|| AlmanacError::NotFound(format!("record {id} is not on the agenda")))?;

        let today = self.clock.today();
        let rule = RecurrenceRule::build(record.recurrence.as_deref(), today);
        let mut updated = record.clone();

        let outcome = match next_occurrence_after(&record, rule.as_ref()) {
            Some(next) => {
                updated.scheduled_at = Some(next);
                CompletionOutcome::Rescheduled(next)
            }
            None => {
                updated.done_on = Some(today);
                CompletionOutcome::Completed
            }
        };

        self.store.save(&updated)?;
        let change = ChangeDescriptor::between(&record, &updated);
        self.update_after_save(updated, change);

        debug!(?outcome, "completed record instance");
        Ok(outcome)
    }

    /// Deliver due reminders through `sink`; returns the number delivered.
    pub fn sweep_reminders(&mut self, sink: &dyn ReminderSink) -> usize {
        let grace = Duration::try_minutes(self.config.reminder_grace_minutes)
            .unwrap_or_else(Duration::zero);
        reminders::sweep(&mut self.agenda, self.clock.now(), grace, sink)
    }

    /// Every occurrence, sorted ascending by timestamp.
    pub fn agenda(&self) -> &[AgendaEntry] {
        &self.agenda
    }

    /// Occurrences with `from <= at < to`.
    pub fn entries_between(&self, from: Timestamp, to: Timestamp) -> &[AgendaEntry] {
        let start = self.agenda.partition_point(|entry| entry.at() < from);
        let end = self.agenda.partition_point(|entry| entry.at() < to).max(start);
        &self.agenda[start..end]
    }

    pub fn scheduled_records(&self) -> impl Iterator<Item = &ScheduledRecord> {
        self.scheduled.iter().map(|record| &**record)
    }

    /// Top-level notes, sorted by title.
    pub fn top_level_notes(&self) -> impl Iterator<Item = &ScheduledRecord> {
        self.notes.iter().map(|record| &**record)
    }

    /// Look up a cached scheduled record or note.
    pub fn record(&self, id: RecordId) -> Option<&ScheduledRecord> {
        self.scheduled
            .iter()
            .chain(self.notes.iter())
            .find(|record| record.id == id)
            .map(|record| &**record)
    }

    fn expand(&self, record: &Arc<ScheduledRecord>) -> Vec<AgendaEntry> {
        let now = self.clock.now();
        let rule = RecurrenceRule::build(record.recurrence.as_deref(), now.date());

        project(record, rule.as_ref(), true)
            .map(|at| {
                let reminders = if record.scheduled_at == Some(at) {
                    compute_reminders(record, now)
                } else {
                    Default::default()
                };
                AgendaEntry::new(Arc::clone(record), at, reminders)
            })
            .collect()
    }

    fn remove_traces(&mut self, id: RecordId) -> Removal {
        let mut removal = Removal::default();

        let before = self.scheduled.len() + self.notes.len();
        self.scheduled.retain(|record| record.id != id);
        self.notes.retain(|record| record.id != id);
        removal.found = self.scheduled.len() + self.notes.len() != before;

        let occurrences = self.agenda.len();
        self.agenda.retain(|entry| {
            if entry.record_id() != id {
                return true;
            }
            removal.highlighted |= entry.record().is_highlighted();
            false
        });
        removal.found |= self.agenda.len() != occurrences;

        removal
    }

    fn sort_agenda(&mut self) {
        self.agenda.sort_by_key(AgendaEntry::at);
    }

    fn sort_notes(&mut self) {
        self.notes.sort_by(|a, b| a.title.cmp(&b.title));
    }

    fn notify(&self, change: &ChangeDescriptor) {
        if let Some(observer) = &self.observer {
            observer.agenda_changed(change);
        }
    }
}
