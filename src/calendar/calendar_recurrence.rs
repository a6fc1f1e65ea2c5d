//! RRULE parsing and expansion.
//
// Only the frequency based subset of RFC 5545 is expanded: FREQ, INTERVAL,
// COUNT and UNTIL. Other rule parts are reported and ignored.

use super::{EventStart, PropertyError, Window};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;
use std::str::FromStr;

/// Upper bound on generated candidates for one recurring event
const MAX_EXPANSION_STEPS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    pub fn to_rfc5545(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Daily => "DAILY",
            RecurrenceFrequency::Weekly => "WEEKLY",
            RecurrenceFrequency::Monthly => "MONTHLY",
            RecurrenceFrequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(RecurrenceFrequency::Daily),
            "WEEKLY" => Ok(RecurrenceFrequency::Weekly),
            "MONTHLY" => Ok(RecurrenceFrequency::Monthly),
            "YEARLY" => Ok(RecurrenceFrequency::Yearly),
            other => Err(format!("unsupported frequency '{}'", other)),
        }
    }
}

/// End bound of a recurrence, in the form the UNTIL value was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
    Floating(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Until>,
    /// Rule parts that were present but are not expanded (e.g. `BYDAY`)
    pub ignored_parts: Vec<String>,
}

impl RecurrencePattern {
    pub fn new(frequency: RecurrenceFrequency) -> Self {
        Self { frequency, interval: 1, count: None, until: None, ignored_parts: Vec::new() }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_until(mut self, until: Until) -> Self {
        self.until = Some(until);
        self
    }

    /// Wall-clock start of the `n`th candidate, `None` when that date does not
    /// exist (e.g. the 31st in a 30 day month).
    pub fn nth_start(&self, dtstart: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        let step = i64::from(n) * i64::from(self.interval);
        match self.frequency {
            RecurrenceFrequency::Daily => dtstart.checked_add_signed(Duration::days(step)),
            RecurrenceFrequency::Weekly => dtstart.checked_add_signed(Duration::days(step * 7)),
            RecurrenceFrequency::Monthly => {
                shift_months(dtstart.date(), step).map(|d| d.and_time(dtstart.time()))
            }
            RecurrenceFrequency::Yearly => {
                shift_months(dtstart.date(), step * 12).map(|d| d.and_time(dtstart.time()))
            }
        }
    }

    fn allows(&self, local: NaiveDateTime, instant: &DateTime<FixedOffset>) -> bool {
        match self.until {
            None => true,
            Some(Until::Date(date)) => local.date() <= date,
            Some(Until::Instant(until)) => instant.with_timezone(&Utc) <= until,
            Some(Until::Floating(until)) => local <= until,
        }
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, date.day())
}

/// Parse an RRULE value such as `FREQ=WEEKLY;INTERVAL=2;COUNT=10`
pub fn parse_ical_recurrence(rrule: &str) -> Result<RecurrencePattern, PropertyError> {
    let body = rrule.trim();
    let body = body.strip_prefix("RRULE:").unwrap_or(body);
    let invalid = |reason: String| PropertyError::InvalidRule { rule: rrule.to_string(), reason };

    let mut frequency = None;
    let mut interval = 1;
    let mut count = None;
    let mut until = None;
    let mut ignored_parts = Vec::new();

    for part in body.split(';').filter(|p| !p.is_empty()) {
        let (key, value) =
            part.split_once('=').ok_or_else(|| invalid(format!("missing '=' in '{}'", part)))?;
        match key.to_ascii_uppercase().as_str() {
            "FREQ" => frequency = Some(value.parse::<RecurrenceFrequency>().map_err(invalid)?),
            "INTERVAL" => {
                interval = value
                    .parse::<u32>()
                    .ok()
                    .filter(|i| *i > 0)
                    .ok_or_else(|| invalid(format!("bad INTERVAL '{}'", value)))?;
            }
            "COUNT" => {
                count = Some(
                    value.parse::<u32>().map_err(|_| invalid(format!("bad COUNT '{}'", value)))?,
                );
            }
            "UNTIL" => {
                until = Some(
                    parse_until(value).ok_or_else(|| invalid(format!("bad UNTIL '{}'", value)))?,
                );
            }
            _ => ignored_parts.push(part.to_string()),
        }
    }

    let frequency = frequency.ok_or_else(|| invalid("missing FREQ".to_string()))?;
    Ok(RecurrencePattern { frequency, interval, count, until, ignored_parts })
}

fn parse_until(value: &str) -> Option<Until> {
    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok().map(Until::Date);
    }
    if let Some(utc) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .ok()
            .map(|naive| Until::Instant(Utc.from_utc_datetime(&naive)));
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok().map(Until::Floating)
}

/// Occurrence instants of an event that start inside `window`.
///
/// COUNT is applied before EXDATE and window filtering, as RFC 5545 requires.
pub fn expand_occurrences(
    start: &EventStart,
    rule: Option<&RecurrencePattern>,
    exdates: &[DateTime<FixedOffset>],
    window: &Window,
) -> Vec<DateTime<FixedOffset>> {
    let keep = |instant: &DateTime<FixedOffset>| {
        window.contains(instant) && !exdates.iter().any(|ex| ex == instant)
    };

    let Some(rule) = rule else {
        return start.instant().filter(|i| keep(i)).into_iter().collect();
    };

    let mut occurrences = Vec::new();
    let mut generated = 0u32;
    for n in 0..MAX_EXPANSION_STEPS {
        if rule.count.is_some_and(|count| generated >= count) {
            return occurrences;
        }
        let Some(local) = rule.nth_start(start.local, n) else {
            continue;
        };
        let Some(instant) = start.resolve(local) else {
            continue;
        };
        if !rule.allows(local, &instant) || window.is_past(&instant) {
            return occurrences;
        }
        generated += 1;
        if keep(&instant) {
            occurrences.push(instant);
        }
    }
    warn!(
        "Recurrence starting {} stopped after {} steps before reaching the window end",
        start.local, MAX_EXPANSION_STEPS
    );
    occurrences
}
