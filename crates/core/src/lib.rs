//! # Almanac Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The recurrence rule codec and occurrence projector
//! - The live agenda cache with highlight assignment and reminder sweep
//! - Port interfaces (traits) for the record store, observers and clock
//!
//! ## Architecture Principles
//! - Only depends on `almanac-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Single-threaded access: callers sharing a cache across threads wrap
//!   the whole cache in one lock

pub mod agenda;
pub mod recurrence;

// Re-export specific items to avoid ambiguity
pub use agenda::ports::{AgendaObserver, Clock, RecordStore, ReminderSink, SystemClock};
pub use agenda::{AgendaCache, AgendaEntry, CompletionOutcome, DueReminder, ReminderKind};
pub use recurrence::{next_occurrence_after, project, RecurrenceEntry, RecurrenceRule};
