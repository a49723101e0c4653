//! Shared test helpers for `almanac-core` integration tests.
//!
//! Lightweight in-memory mocks for the agenda ports so tests can focus on
//! cache behaviour instead of boilerplate.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use almanac_core::{AgendaObserver, Clock, DueReminder, RecordStore, ReminderSink};
use almanac_domain::{
    AgendaConfig, AlmanacError, ChangeDescriptor, RecordId, Result as DomainResult,
    ScheduledRecord, Timestamp,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a `YYYYMMDDHHMM` literal.
pub fn ts(raw: &str) -> Timestamp {
    Timestamp::parse(raw).expect("valid timestamp literal")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date literal")
}

pub fn config(colors: usize) -> AgendaConfig {
    AgendaConfig { highlight_colors: colors, ..AgendaConfig::default() }
}

/// In-memory record store.
///
/// Applies the same qualification filters as the SQL queries and records
/// every batched `mark_done` call.
#[derive(Default)]
pub struct MockRecordStore {
    records: Mutex<Vec<ScheduledRecord>>,
    mark_done_calls: Mutex<Vec<Vec<RecordId>>>,
    fail_loads: Mutex<bool>,
}

impl MockRecordStore {
    pub fn new(records: Vec<ScheduledRecord>) -> Arc<Self> {
        Arc::new(Self { records: Mutex::new(records), ..Self::default() })
    }

    pub fn fail_loads(&self) {
        *self.fail_loads.lock().unwrap() = true;
    }

    pub fn get(&self, id: RecordId) -> Option<ScheduledRecord> {
        self.records.lock().unwrap().iter().find(|record| record.id == id).cloned()
    }

    pub fn mark_done_calls(&self) -> Vec<Vec<RecordId>> {
        self.mark_done_calls.lock().unwrap().clone()
    }

    fn load_where(&self, keep: fn(&ScheduledRecord) -> bool) -> DomainResult<Vec<ScheduledRecord>> {
        if *self.fail_loads.lock().unwrap() {
            return Err(AlmanacError::Database("store offline".into()));
        }
        Ok(self.records.lock().unwrap().iter().filter(|record| keep(record)).cloned().collect())
    }
}

impl RecordStore for MockRecordStore {
    fn load_scheduled(&self) -> DomainResult<Vec<ScheduledRecord>> {
        self.load_where(ScheduledRecord::qualifies_as_scheduled)
    }

    fn load_top_level_notes(&self) -> DomainResult<Vec<ScheduledRecord>> {
        self.load_where(ScheduledRecord::qualifies_as_top_level_note)
    }

    fn mark_done(&self, ids: &[RecordId], on: NaiveDate) -> DomainResult<usize> {
        self.mark_done_calls.lock().unwrap().push(ids.to_vec());
        let mut records = self.records.lock().unwrap();
        let mut updated = 0;
        for record in records.iter_mut().filter(|record| ids.contains(&record.id)) {
            record.done_on = Some(on);
            updated += 1;
        }
        Ok(updated)
    }

    fn save(&self, record: &ScheduledRecord) -> DomainResult<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }
}

/// Clock frozen at a settable instant.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(raw: &str) -> Arc<Self> {
        Arc::new(Self { now: Mutex::new(ts(raw).as_datetime()) })
    }

    pub fn set(&self, raw: &str) {
        *self.now.lock().unwrap() = ts(raw).as_datetime();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

/// Observer that remembers every change descriptor it was given.
#[derive(Default)]
pub struct RecordingObserver {
    changes: Mutex<Vec<ChangeDescriptor>>,
}

impl RecordingObserver {
    pub fn changes(&self) -> Vec<ChangeDescriptor> {
        self.changes.lock().unwrap().clone()
    }
}

impl AgendaObserver for RecordingObserver {
    fn agenda_changed(&self, change: &ChangeDescriptor) {
        self.changes.lock().unwrap().push(*change);
    }
}

/// Sink that collects delivered reminders.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<DueReminder>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<DueReminder> {
        self.delivered.lock().unwrap().clone()
    }
}

impl ReminderSink for RecordingSink {
    fn deliver(&self, reminder: &DueReminder) {
        self.delivered.lock().unwrap().push(reminder.clone());
    }
}
