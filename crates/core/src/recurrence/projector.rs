//! Occurrence projection
//!
//! Expands a record's recurrence rule into concrete timestamps. Every
//! pattern entry walks forward from the record's own scheduled time with
//! [`advance`] until it passes the rule's end time or hits
//! [`MAX_PATTERN_ITERATIONS`]. Results are collected in a set, so instants
//! produced by several entries collapse into one.

use std::collections::{BTreeSet, HashSet};

use almanac_domain::constants::{MAX_PATTERN_ITERATIONS, MAX_WEEK_OF_MONTH_JUMPS, WEEKS_IN_MONTH_MASK};
use almanac_domain::{ScheduledRecord, TimeType, Timestamp};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::rule::{RecurrenceEntry, RecurrenceRule};

/// Reminder instants computed for a record's current occurrence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingReminders {
    pub prep_at: Option<Timestamp>,
    pub start_at: Option<Timestamp>,
}

impl PendingReminders {
    pub fn is_empty(&self) -> bool {
        self.prep_at.is_none() && self.start_at.is_none()
    }
}

/// Project a record into its occurrence timestamps.
///
/// With `include_current` the record's own scheduled time comes first, even
/// for records without a rule. The remaining timestamps follow in ascending
/// order. The sequence is recomputed on every call.
pub fn project(
    record: &ScheduledRecord,
    rule: Option<&RecurrenceRule>,
    include_current: bool,
) -> impl Iterator<Item = Timestamp> {
    let current = if include_current { record.scheduled_at } else { None };
    let repeats = rule.map(|rule| expand(record.scheduled_at, rule)).unwrap_or_default();

    current.into_iter().chain(repeats.into_iter().filter(move |at| Some(*at) != current))
}

/// First occurrence strictly after the record's scheduled time.
///
/// `None` means the series is exhausted before its end bound (or the record
/// does not repeat), so completing the record truly completes it.
pub fn next_occurrence_after(
    record: &ScheduledRecord,
    rule: Option<&RecurrenceRule>,
) -> Option<Timestamp> {
    let base = record.scheduled_at;
    project(record, rule, false).find(|at| base.map_or(true, |base| *at > base))
}

/// Advance one step of a pattern entry from `from`.
///
/// Returns the next candidate with the entry's fixed time of day applied, or
/// `None` when the entry cannot make progress (bad argument, empty week
/// mask, exception entries).
pub fn advance(from: Timestamp, entry: &RecurrenceEntry) -> Option<Timestamp> {
    let (date, at) = match entry {
        RecurrenceEntry::NDays { at, interval } => {
            if *interval < 1 {
                return None;
            }
            (from.date().checked_add_signed(Duration::try_days(i64::from(*interval))?)?, *at)
        }
        RecurrenceEntry::DayOfMonth { at, day } => (next_day_of_month(from.date(), *day)?, *at),
        RecurrenceEntry::WeekOfMonth { at, weekday, weeks } => {
            (next_week_of_month(from.date(), *weekday, weeks)?, *at)
        }
        RecurrenceEntry::AddSpecific { .. } | RecurrenceEntry::DeleteSpecific { .. } => return None,
    };

    Some(Timestamp::from_parts(date, at))
}

/// Reminders for the current occurrence, dropping any already in the past.
pub fn compute_reminders(record: &ScheduledRecord, now: NaiveDateTime) -> PendingReminders {
    let Some(at) = record.scheduled_at else {
        return PendingReminders::default();
    };
    let now = Timestamp::new(now);
    let still_ahead = |instant: Timestamp| (instant >= now).then_some(instant);

    let start_at = (record.time_type == TimeType::Exact).then_some(at).and_then(still_ahead);
    let prep_at = record
        .prep_duration()
        .and_then(|lead| at.checked_sub(lead))
        .and_then(still_ahead);

    PendingReminders { prep_at, start_at }
}

fn expand(base: Option<Timestamp>, rule: &RecurrenceRule) -> BTreeSet<Timestamp> {
    let max_time = rule.end_time;
    let deleted: HashSet<Timestamp> = rule.deletions().collect();
    let mut times: BTreeSet<Timestamp> = rule.additions().collect();

    let Some(base) = base else {
        return times;
    };

    for entry in rule.patterns() {
        let mut cursor = base;
        for _ in 0..MAX_PATTERN_ITERATIONS {
            let Some(next) = advance(cursor, entry) else {
                break;
            };
            if next > max_time {
                break;
            }
            if !deleted.contains(&next) {
                times.insert(next);
            }
            cursor = next;
        }
    }

    times
}

fn next_day_of_month(from: NaiveDate, day: i32) -> Option<NaiveDate> {
    let day = u32::try_from(day).ok().filter(|day| (1..=31).contains(day))?;
    let mut date = from.succ_opt()?;
    // Any day 1..=31 recurs within two months.
    while date.day() != day {
        date = date.succ_opt()?;
    }
    Some(date)
}

fn next_week_of_month(from: NaiveDate, weekday: i32, weeks: &[bool]) -> Option<NaiveDate> {
    let weekday = u32::try_from(weekday).ok().filter(|weekday| *weekday < 7)?;
    if weeks.len() != WEEKS_IN_MONTH_MASK || !weeks.iter().any(|flag| *flag) {
        return None;
    }

    let mut date = from.succ_opt()?;
    while date.weekday().num_days_from_sunday() != weekday {
        date = date.succ_opt()?;
    }

    for _ in 0..MAX_WEEK_OF_MONTH_JUMPS {
        // 0-indexed week of month: days 29..=31 share index 4 with 22..=28.
        let week = ((date.day() - 1) / 7) as usize;
        if weeks[week] {
            return Some(date);
        }
        date = date.checked_add_signed(Duration::days(7))?;
    }
    None
}
