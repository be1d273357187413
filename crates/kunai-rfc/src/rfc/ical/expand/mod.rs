//! Time zone resolution and recurrence expansion.

mod recurrence;
mod timezone;

pub use recurrence::{Instance, RecurrenceSet, event_duration};
pub use timezone::{ConversionError, TimeZoneResolver, normalize_tzid};
