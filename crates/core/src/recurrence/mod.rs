//! Recurrence rules and their expansion into concrete occurrences
//!
//! A repeating record carries a packed rule string. [`RecurrenceRule`]
//! decodes it into typed entries and packs it back; the projector expands a
//! rule against the record's base time into timestamps bounded by the
//! rule's end time and fixed iteration ceilings.

pub mod projector;
pub mod rule;

pub use projector::{advance, compute_reminders, next_occurrence_after, project, PendingReminders};
pub use rule::{RecurrenceEntry, RecurrenceRule};
