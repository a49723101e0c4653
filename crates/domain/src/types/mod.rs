//! Domain types and models

pub mod change;
pub mod record;
pub mod timestamp;

pub use change::ChangeDescriptor;
pub use record::{Importance, RecordId, ScheduledRecord, TimeType, Visibility};
pub use timestamp::{Timestamp, TimestampParseError};
