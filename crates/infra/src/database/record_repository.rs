//! SQLite-backed record store
//!
//! Implements the core `RecordStore` port. Enum columns are stored as their
//! lowercase names and timestamps in canonical `YYYYMMDDHHMM` text; rows that
//! fail to decode are loaded leniently with a warning instead of failing the
//! whole query.

use std::str::FromStr;
use std::sync::Arc;

use almanac_core::RecordStore;
use almanac_domain::{
    Importance, RecordId, Result as DomainResult, ScheduledRecord, TimeType, Timestamp, Visibility,
};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument, warn};

use super::manager::{map_sql_error, DbManager};

const DATE_FORMAT: &str = "%Y%m%d";

const SELECT_COLUMNS: &str = "SELECT id, parent_id, title, time_type, importance, visibility,
        scheduled_at, duration, prep_duration, done_on, recurrence, is_quick_capture
 FROM records";

/// SQLite-backed implementation of [`RecordStore`]
pub struct SqliteRecordStore {
    db: Arc<DbManager>,
}

impl SqliteRecordStore {
    /// Create a new store on top of a migrated database
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Fetch a single record regardless of its state.
    #[instrument(skip(self))]
    pub fn get(&self, id: RecordId) -> DomainResult<Option<ScheduledRecord>> {
        let conn = self.db.get_connection()?;
        let row = conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], RawRecord::from_row)
            .optional()
            .map_err(map_sql_error)?;
        Ok(row.map(RawRecord::into_record))
    }

    fn query(&self, filter: &str) -> DomainResult<Vec<ScheduledRecord>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} {filter}")).map_err(map_sql_error)?;
        let rows = stmt
            .query_map([], RawRecord::from_row)
            .map_err(map_sql_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sql_error)?;
        Ok(rows.into_iter().map(RawRecord::into_record).collect())
    }
}

impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self))]
    fn load_scheduled(&self) -> DomainResult<Vec<ScheduledRecord>> {
        let records = self.query(
            "WHERE scheduled_at IS NOT NULL AND scheduled_at <> '' AND done_on IS NULL
             ORDER BY scheduled_at, id",
        )?;
        debug!(count = records.len(), "loaded scheduled records");
        Ok(records)
    }

    #[instrument(skip(self))]
    fn load_top_level_notes(&self) -> DomainResult<Vec<ScheduledRecord>> {
        let records = self.query(
            "WHERE (scheduled_at IS NULL OR scheduled_at = '') AND parent_id IS NULL
               AND is_quick_capture = 0 AND done_on IS NULL
             ORDER BY title, id",
        )?;
        debug!(count = records.len(), "loaded top-level notes");
        Ok(records)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    fn mark_done(&self, ids: &[RecordId], on: NaiveDate) -> DomainResult<usize> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        let done_on = on.format(DATE_FORMAT).to_string();

        let mut updated = 0;
        {
            let mut stmt = tx
                .prepare("UPDATE records SET done_on = ?1 WHERE id = ?2 AND done_on IS NULL")
                .map_err(map_sql_error)?;
            for id in ids {
                updated += stmt.execute(params![done_on, id]).map_err(map_sql_error)?;
            }
        }

        tx.commit().map_err(map_sql_error)?;
        Ok(updated)
    }

    #[instrument(skip(self, record), fields(record_id = record.id))]
    fn save(&self, record: &ScheduledRecord) -> DomainResult<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            "INSERT INTO records (id, parent_id, title, time_type, importance, visibility,
                                  scheduled_at, duration, prep_duration, done_on, recurrence,
                                  is_quick_capture)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                parent_id = excluded.parent_id,
                title = excluded.title,
                time_type = excluded.time_type,
                importance = excluded.importance,
                visibility = excluded.visibility,
                scheduled_at = excluded.scheduled_at,
                duration = excluded.duration,
                prep_duration = excluded.prep_duration,
                done_on = excluded.done_on,
                recurrence = excluded.recurrence,
                is_quick_capture = excluded.is_quick_capture",
            params![
                record.id,
                record.parent_id,
                record.title,
                record.time_type.to_string(),
                record.importance.to_string(),
                record.visibility.to_string(),
                record.scheduled_at.map(|at| at.to_string()),
                record.duration,
                record.prep_duration,
                record.done_on.map(|on| on.format(DATE_FORMAT).to_string()),
                record.recurrence,
                record.is_quick_capture,
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }
}

// =============================================================================
// Row decoding
// =============================================================================

/// Column values as stored, before lenient decoding
struct RawRecord {
    id: RecordId,
    parent_id: Option<RecordId>,
    title: String,
    time_type: String,
    importance: String,
    visibility: String,
    scheduled_at: Option<String>,
    duration: Option<String>,
    prep_duration: Option<String>,
    done_on: Option<String>,
    recurrence: Option<String>,
    is_quick_capture: bool,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            title: row.get(2)?,
            time_type: row.get(3)?,
            importance: row.get(4)?,
            visibility: row.get(5)?,
            scheduled_at: row.get(6)?,
            duration: row.get(7)?,
            prep_duration: row.get(8)?,
            done_on: row.get(9)?,
            recurrence: row.get(10)?,
            is_quick_capture: row.get(11)?,
        })
    }

    fn into_record(self) -> ScheduledRecord {
        let id = self.id;

        let scheduled_at = self.scheduled_at.filter(|raw| !raw.is_empty()).and_then(|raw| {
            Timestamp::parse(&raw)
                .map_err(|err| warn!(record_id = id, value = %raw, error = %err, "unparsable scheduled time"))
                .ok()
        });
        let done_on = self.done_on.filter(|raw| !raw.is_empty()).and_then(|raw| {
            let parsed = parse_done_date(&raw);
            if parsed.is_none() {
                warn!(record_id = id, value = %raw, "unparsable done date");
            }
            parsed
        });

        ScheduledRecord {
            id,
            parent_id: self.parent_id,
            title: self.title,
            time_type: decode_enum::<TimeType>(id, "time_type", &self.time_type),
            importance: decode_enum::<Importance>(id, "importance", &self.importance),
            visibility: decode_enum::<Visibility>(id, "visibility", &self.visibility),
            scheduled_at,
            duration: self.duration,
            prep_duration: self.prep_duration,
            done_on,
            recurrence: self.recurrence,
            is_quick_capture: self.is_quick_capture,
        }
    }
}

/// `YYYYMMDD`, fixed width.
fn parse_done_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw.get(..4)?.parse().ok()?;
    let month = raw.get(4..6)?.parse().ok()?;
    let day = raw.get(6..)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn decode_enum<T>(id: RecordId, column: &'static str, raw: &str) -> T
where
    T: FromStr<Err = String> + Default,
{
    T::from_str(raw).unwrap_or_else(|err| {
        warn!(record_id = id, column, error = %err, "unknown enum value, using default");
        T::default()
    })
}
