//! ICS import for on-call rotation exports.
//
// Every VEVENT is turned into one `Event` per occurrence inside the window.

use super::{
    expand_occurrences, parse_ical_recurrence, unescape_text, Event, EventSource, EventStart,
    PropertyError, SourceError, Window,
};
use chrono::{DateTime, FixedOffset};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// An `.ics` file on disk
#[derive(Debug, Clone)]
pub struct IcsFile {
    path: PathBuf,
}

impl IcsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for IcsFile {
    fn events(&self, window: &Window) -> Result<Vec<Event>, SourceError> {
        let file = File::open(&self.path)
            .map_err(|source| SourceError::Open { path: self.path.clone(), source })?;
        let events = import_ics_events(BufReader::new(file), &self.path, window)?;
        debug!("Read {} events in window from {}", events.len(), self.path.display());
        Ok(events)
    }
}

/// Read all VEVENTs from an iCalendar stream, keeping occurrences in `window`.
///
/// `origin` is only used to label errors.
pub fn import_ics_events<R: BufRead>(
    reader: R,
    origin: &Path,
    window: &Window,
) -> Result<Vec<Event>, SourceError> {
    let mut events = Vec::new();
    for calendar in IcalParser::new(reader) {
        let calendar = calendar.map_err(|e| SourceError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        let invalid = |(summary, source): (String, PropertyError)| SourceError::InvalidEvent {
            path: origin.to_path_buf(),
            summary,
            source,
        };
        let overrides = collect_overrides(&calendar.events).map_err(invalid)?;
        for ical_event in &calendar.events {
            import_ical_event(ical_event, &overrides, window, &mut events).map_err(invalid)?;
        }
    }
    Ok(events)
}

/// Occurrence instants replaced by RECURRENCE-ID overrides, keyed by UID
type Overrides = HashMap<String, Vec<DateTime<FixedOffset>>>;

fn find_property<'a>(ical_event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    ical_event.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn property_value<'a>(property: &'a Property) -> &'a str {
    property.value.as_deref().unwrap_or_default()
}

/// Gather the `(UID, RECURRENCE-ID)` pairs of override VEVENTs (e.g. a shift swap)
fn collect_overrides(ical_events: &[IcalEvent]) -> Result<Overrides, (String, PropertyError)> {
    let mut overrides = Overrides::new();
    for ical_event in ical_events {
        let (Some(uid), Some(recurrence_id)) =
            (find_property(ical_event, "UID"), find_property(ical_event, "RECURRENCE-ID"))
        else {
            continue;
        };
        let replaced = EventStart::parse(property_value(recurrence_id), &recurrence_id.params)
            .map_err(|source| {
                let summary = find_property(ical_event, "SUMMARY")
                    .map(|p| unescape_text(property_value(p)))
                    .unwrap_or_default();
                (summary, source)
            })?;
        overrides
            .entry(property_value(uid).to_string())
            .or_default()
            .extend(replaced.instant());
    }
    Ok(overrides)
}

/// Expand a single VEVENT into `out`
fn import_ical_event(
    ical_event: &IcalEvent,
    overrides: &Overrides,
    window: &Window,
    out: &mut Vec<Event>,
) -> Result<(), (String, PropertyError)> {
    let mut summary = String::new();
    let mut uid = None;
    let mut is_override = false;
    let mut dtstart = None;
    let mut rrule = None;
    let mut exdate_props = Vec::new();

    for property in &ical_event.properties {
        let value = property_value(property);
        match property.name.to_ascii_uppercase().as_str() {
            "SUMMARY" => summary = unescape_text(value),
            "UID" => uid = Some(value),
            "RECURRENCE-ID" => is_override = true,
            "DTSTART" => dtstart = Some((value, &property.params)),
            "RRULE" => rrule = Some(value),
            "EXDATE" => exdate_props.push((value, &property.params)),
            _ => {}
        }
    }

    let Some((start_value, start_params)) = dtstart else {
        warn!("Skipping event '{}' without DTSTART", summary);
        return Ok(());
    };
    let fail = |source: PropertyError| (summary.clone(), source);

    let start = EventStart::parse(start_value, start_params).map_err(fail)?;

    let rule = rrule.map(parse_ical_recurrence).transpose().map_err(fail)?;
    if let Some(rule) = &rule {
        if !rule.ignored_parts.is_empty() {
            warn!(
                "Event '{}': ignoring unsupported RRULE parts {}",
                summary,
                rule.ignored_parts.join(";")
            );
        }
    }

    let mut exdates = Vec::new();
    for (value, params) in exdate_props {
        for part in value.split(',').filter(|p| !p.trim().is_empty()) {
            let excluded = EventStart::parse(part, params).map_err(fail)?;
            exdates.extend(excluded.instant());
        }
    }
    if !is_override {
        if let Some(replaced) = uid.and_then(|uid| overrides.get(uid)) {
            debug!("Event '{}': {} occurrences overridden", summary, replaced.len());
            exdates.extend(replaced.iter().copied());
        }
    }

    for start in expand_occurrences(&start, rule.as_ref(), &exdates, window) {
        out.push(Event::new(start, summary.clone()));
    }
    Ok(())
}
