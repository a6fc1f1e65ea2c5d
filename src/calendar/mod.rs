//! Calendar event source for on-call rotation exports.
//
// Reads iCalendar files into a flat list of `Event`s limited to a report window.

use std::path::PathBuf;

mod calendar_datetime;
mod calendar_import;
mod calendar_recurrence;
mod calendar_types;

pub use calendar_datetime::*;
pub use calendar_import::*;
pub use calendar_recurrence::*;
pub use calendar_types::*;

/// Errors raised while reading a calendar export
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to open calendar file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed calendar content in '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Invalid event '{summary}' in '{}': {source}", path.display())]
    InvalidEvent {
        path: PathBuf,
        summary: String,
        #[source]
        source: PropertyError,
    },
}

/// Errors for a single iCalendar property value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("invalid date/time value '{0}'")]
    InvalidDateTime(String),
    #[error("invalid recurrence rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },
}

/// Anything that can hand out the events starting inside a window.
pub trait EventSource {
    fn events(&self, window: &Window) -> Result<Vec<Event>, SourceError>;
}

impl EventSource for Vec<Event> {
    fn events(&self, window: &Window) -> Result<Vec<Event>, SourceError> {
        Ok(self.iter().filter(|e| window.contains(&e.start)).cloned().collect())
    }
}
