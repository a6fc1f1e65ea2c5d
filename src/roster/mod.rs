//! Weekly on-call roster aggregation.
//!
//! Events are bucketed by ISO week, each bucket holding the people on call
//! that week in the order they were first seen.

mod aggregate;
mod person;
mod week;

pub use aggregate::{aggregate, aggregate_with_marker, AggregationResult, Roster};
pub use person::{extract, extract_with_marker, PERSON_MARKER};
pub use week::{week_start, WeekKey};

/// Errors for week keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Invalid week key '{0}', expected YEAR-WEEK")]
    InvalidWeekKey(String),
    #[error("Week {0} is outside the supported date range")]
    OutOfRange(WeekKey),
}
