//! Scheduled record as seen by the agenda
//!
//! This is a read-only projection of a task/note row. The agenda never
//! mutates records itself except through explicit completion, which goes
//! back through the store.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;
use crate::types::Timestamp;
use crate::utils::duration::parse_compact_duration;

/// Identifier of a record in the backing store
pub type RecordId = i64;

/// How precisely a record's time is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeType {
    #[default]
    None,
    Approximate,
    DayOnly,
    Exact,
}

impl_domain_enum_conversions!(TimeType {
    None => "none",
    Approximate => "approximate",
    DayOnly => "day_only",
    Exact => "exact",
});

/// Record importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

impl_domain_enum_conversions!(Importance {
    Low => "low",
    Normal => "normal",
    High => "high",
});

/// How prominently a record shows on the agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    LowClutter,
    #[default]
    Normal,
    PlanAround,
    Highlight,
}

impl_domain_enum_conversions!(Visibility {
    LowClutter => "low_clutter",
    Normal => "normal",
    PlanAround => "plan_around",
    Highlight => "highlight",
});

/// Task/note record consumed by the agenda cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    #[serde(default)]
    pub time_type: TimeType,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    /// Compact `<N><unit>` duration, parsed leniently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Compact `<N><unit>` lead time for the prep reminder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_on: Option<NaiveDate>,
    pub title: String,
    /// Packed recurrence rule; `None` means the record does not repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub is_quick_capture: bool,
}

impl ScheduledRecord {
    /// Create an unscheduled record with default attributes.
    pub fn new(id: RecordId, title: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: None,
            time_type: TimeType::None,
            importance: Importance::Normal,
            visibility: Visibility::Normal,
            scheduled_at: None,
            duration: None,
            prep_duration: None,
            done_on: None,
            title: title.into(),
            recurrence: None,
            is_quick_capture: false,
        }
    }

    /// Schedule the record at an exact minute.
    pub fn at(mut self, at: Timestamp) -> Self {
        self.scheduled_at = Some(at);
        self.time_type = TimeType::Exact;
        self
    }

    pub fn with_time_type(mut self, time_type: TimeType) -> Self {
        self.time_type = time_type;
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_prep_duration(mut self, prep: impl Into<String>) -> Self {
        self.prep_duration = Some(prep.into());
        self
    }

    pub fn with_recurrence(mut self, packed: impl Into<String>) -> Self {
        self.recurrence = Some(packed.into());
        self
    }

    pub fn with_parent(mut self, parent_id: RecordId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn done(mut self, on: NaiveDate) -> Self {
        self.done_on = Some(on);
        self
    }

    /// Has a time and is not done.
    pub fn qualifies_as_scheduled(&self) -> bool {
        self.scheduled_at.is_some() && self.done_on.is_none()
    }

    /// Unscheduled, parentless, not a quick-capture item, not done.
    pub fn qualifies_as_top_level_note(&self) -> bool {
        self.scheduled_at.is_none()
            && self.parent_id.is_none()
            && !self.is_quick_capture
            && self.done_on.is_none()
    }

    pub fn is_highlighted(&self) -> bool {
        self.visibility == Visibility::Highlight
    }

    /// Parsed duration; absent or unparsable yields `None`.
    pub fn duration(&self) -> Option<Duration> {
        self.duration.as_deref().and_then(|raw| parse_compact_duration(raw).ok())
    }

    /// Parsed prep lead time; absent or unparsable yields `None`.
    pub fn prep_duration(&self) -> Option<Duration> {
        self.prep_duration.as_deref().and_then(|raw| parse_compact_duration(raw).ok())
    }

    /// Whether the record carries a non-empty recurrence string.
    pub fn repeats(&self) -> bool {
        self.recurrence.as_deref().is_some_and(|packed| !packed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    #[test]
    fn scheduled_qualification() {
        let record = ScheduledRecord::new(1, "Standup").at(ts("202401010900"));
        assert!(record.qualifies_as_scheduled());
        assert!(!record.qualifies_as_top_level_note());

        let done = record.done(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!done.qualifies_as_scheduled());
    }

    #[test]
    fn top_level_note_qualification() {
        let note = ScheduledRecord::new(2, "Ideas");
        assert!(note.qualifies_as_top_level_note());

        assert!(!note.clone().with_parent(1).qualifies_as_top_level_note());

        let mut captured = note.clone();
        captured.is_quick_capture = true;
        assert!(!captured.qualifies_as_top_level_note());
    }

    #[test]
    fn lenient_duration_accessors() {
        let record = ScheduledRecord::new(3, "Dentist").with_duration("90m").with_prep_duration("bogus");
        assert_eq!(record.duration(), Some(Duration::minutes(90)));
        assert_eq!(record.prep_duration(), None);
    }

    #[test]
    fn attribute_strings_roundtrip() {
        for visibility in [
            Visibility::LowClutter,
            Visibility::Normal,
            Visibility::PlanAround,
            Visibility::Highlight,
        ] {
            assert_eq!(Visibility::from_str(&visibility.to_string()), Ok(visibility));
        }
        assert_eq!(TimeType::from_str("DAY_ONLY"), Ok(TimeType::DayOnly));
        assert_eq!(Importance::from_str("low"), Ok(Importance::Low));
    }

    #[test]
    fn repeats_ignores_empty_rule() {
        let record = ScheduledRecord::new(4, "Gym").with_recurrence("");
        assert!(!record.repeats());
        assert!(record.with_recurrence("x|pd09001").repeats());
    }
}
