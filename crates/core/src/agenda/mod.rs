//! Live agenda cache
//!
//! The cache owns every projected occurrence of every scheduled record,
//! kept sorted by timestamp, plus the list of scheduled records and the
//! unscheduled top-level notes. It is updated incrementally on each record
//! save and recolors highlighted intervals when needed.

pub mod cache;
pub mod entry;
pub mod highlight;
pub mod ports;
pub mod reminders;

pub use cache::{AgendaCache, CompletionOutcome};
pub use entry::AgendaEntry;
pub use highlight::assign_highlights;
pub use reminders::{DueReminder, ReminderKind};
