#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use almanac_core::{Clock, DueReminder, ReminderSink};
use almanac_domain::Timestamp;
use almanac_infra::database::{DbManager, SqliteRecordStore};
use chrono::NaiveDateTime;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("almanac-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn store(&self) -> SqliteRecordStore {
        SqliteRecordStore::new(Arc::clone(&self.manager))
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ts(raw: &str) -> Timestamp {
    Timestamp::parse(raw).expect("valid timestamp literal")
}

/// Clock frozen at a settable instant.
pub struct FixedClock(Mutex<NaiveDateTime>);

impl FixedClock {
    pub fn at(raw: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(ts(raw).as_datetime())))
    }

    pub fn set(&self, raw: &str) {
        *self.0.lock().unwrap() = ts(raw).as_datetime();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Sink that collects delivered reminders.
#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<DueReminder>>);

impl RecordingSink {
    pub fn delivered(&self) -> Vec<DueReminder> {
        self.0.lock().unwrap().clone()
    }
}

impl ReminderSink for RecordingSink {
    fn deliver(&self, reminder: &DueReminder) {
        self.0.lock().unwrap().push(reminder.clone());
    }
}
