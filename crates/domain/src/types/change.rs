//! Change descriptor produced by diffing a record before and after an edit

use serde::{Deserialize, Serialize};

use crate::types::ScheduledRecord;

/// Which groups of fields changed during an edit
///
/// Passed to the agenda on every save and forwarded to observers so they
/// can skip rebuilding views when nothing schedule-related moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    /// time, time type, visibility, duration, done date, recurrence or title
    pub schedule_changed: bool,
    pub parent_changed: bool,
}

impl ChangeDescriptor {
    /// Descriptor for a change that touched scheduling fields.
    pub const fn schedule() -> Self {
        Self { schedule_changed: true, parent_changed: false }
    }

    /// Compare snapshots taken at begin-edit and end-edit.
    pub fn between(before: &ScheduledRecord, after: &ScheduledRecord) -> Self {
        let schedule_changed = before.scheduled_at != after.scheduled_at
            || before.time_type != after.time_type
            || before.visibility != after.visibility
            || before.duration != after.duration
            || before.done_on != after.done_on
            || before.recurrence != after.recurrence
            || before.title != after.title;

        Self { schedule_changed, parent_changed: before.parent_id != after.parent_id }
    }

    pub fn is_empty(&self) -> bool {
        !self.schedule_changed && !self.parent_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Importance, Timestamp, Visibility};

    #[test]
    fn detects_schedule_fields() {
        let before = ScheduledRecord::new(1, "Review");
        let after = before.clone().at(Timestamp::parse("202401020800").unwrap());
        let change = ChangeDescriptor::between(&before, &after);
        assert!(change.schedule_changed);
        assert!(!change.parent_changed);

        let highlighted = before.clone().with_visibility(Visibility::Highlight);
        assert!(ChangeDescriptor::between(&before, &highlighted).schedule_changed);
    }

    #[test]
    fn importance_alone_is_not_a_schedule_change() {
        let before = ScheduledRecord::new(1, "Review");
        let after = before.clone().with_importance(Importance::High);
        assert!(ChangeDescriptor::between(&before, &after).is_empty());
    }

    #[test]
    fn detects_reparenting() {
        let before = ScheduledRecord::new(1, "Child");
        let after = before.clone().with_parent(9);
        let change = ChangeDescriptor::between(&before, &after);
        assert!(change.parent_changed);
        assert!(!change.schedule_changed);
    }
}
