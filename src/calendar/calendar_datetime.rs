//! Date/time and text value handling for iCalendar properties.
//
// Covers the DTSTART forms seen in rotation exports: UTC, TZID-zoned,
// floating and all-day values.

use super::PropertyError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// iCalendar property parameters as handed out by the `ical` parser
pub type PropertyParams = Option<Vec<(String, Vec<String>)>>;

/// Time zone a start value was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartZone {
    /// UTC, floating and all-day values
    Utc,
    Named(Tz),
}

/// A parsed DTSTART (or EXDATE) value kept in local wall-clock form so
/// recurrences can be stepped in the zone they were defined in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStart {
    pub local: NaiveDateTime,
    pub zone: StartZone,
    pub all_day: bool,
}

impl EventStart {
    pub fn parse(value: &str, params: &PropertyParams) -> Result<Self, PropertyError> {
        let value = value.trim();
        let invalid = || PropertyError::InvalidDateTime(value.to_string());

        let is_date = param(params, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
            || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
        if is_date {
            let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
            let local = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
            return Ok(Self { local, zone: StartZone::Utc, all_day: true });
        }

        if let Some(utc) = value.strip_suffix('Z') {
            let local =
                NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT).map_err(|_| invalid())?;
            return Ok(Self { local, zone: StartZone::Utc, all_day: false });
        }

        let local = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|_| invalid())?;
        let zone = match param(params, "TZID") {
            Some(tzid) => resolve_tzid(tzid),
            None => StartZone::Utc,
        };
        Ok(Self { local, zone, all_day: false })
    }

    /// The instant of this start value
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        self.resolve(self.local)
    }

    /// Place another wall-clock time in this value's zone.
    ///
    /// Times skipped by a DST jump are moved forward by an hour.
    pub fn resolve(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self.zone {
            StartZone::Utc => Some(Utc.fix().from_utc_datetime(&local)),
            StartZone::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
                .map(|dt| dt.with_timezone(&dt.offset().fix())),
        }
    }
}

fn resolve_tzid(tzid: &str) -> StartZone {
    let name = tzid.trim_matches('"').trim_start_matches('/');
    match name.parse::<Tz>() {
        Ok(tz) => StartZone::Named(tz),
        Err(_) => {
            warn!("Unknown TZID '{}', treating time as UTC", tzid);
            StartZone::Utc
        }
    }
}

/// First value of a named parameter, case-insensitive on the name
pub fn param<'a>(params: &'a PropertyParams, name: &str) -> Option<&'a str> {
    params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// Undo iCalendar TEXT escaping (`\,` `\;` `\\` `\n`)
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn params(pairs: &[(&str, &str)]) -> PropertyParams {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), vec![v.to_string()])).collect())
    }

    #[test]
    fn test_parse_utc_value() {
        let start = EventStart::parse("20230306T090000Z", &None).unwrap();
        assert_eq!(start.zone, StartZone::Utc);
        let instant = start.instant().unwrap();
        assert_eq!(instant.offset().local_minus_utc(), 0);
        assert_eq!(instant.hour(), 9);
    }

    #[test]
    fn test_parse_zoned_value_keeps_local_offset() {
        let start =
            EventStart::parse("20230306T000000", &params(&[("TZID", "Europe/Berlin")])).unwrap();
        let instant = start.instant().unwrap();
        assert_eq!(instant.offset().local_minus_utc(), 3600);
        // still Monday locally even though it is Sunday in UTC
        assert_eq!(instant.day(), 6);
        assert_eq!(instant.with_timezone(&Utc).day(), 5);
    }

    #[test]
    fn test_parse_all_day_value() {
        let start = EventStart::parse("20230306", &params(&[("VALUE", "DATE")])).unwrap();
        assert!(start.all_day);
        assert_eq!(start.instant().unwrap().to_rfc3339(), "2023-03-06T00:00:00+00:00");
    }

    #[test]
    fn test_unknown_tzid_falls_back_to_utc() {
        let start = EventStart::parse("20230306T090000", &params(&[("TZID", "Mars/Olympus")]))
            .unwrap();
        assert_eq!(start.zone, StartZone::Utc);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        assert_eq!(
            EventStart::parse("next tuesday", &None),
            Err(PropertyError::InvalidDateTime("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 02:30 does not exist in Berlin on 2023-03-26
        let start =
            EventStart::parse("20230326T023000", &params(&[("TZID", "Europe/Berlin")])).unwrap();
        let instant = start.instant().unwrap();
        assert_eq!((instant.hour(), instant.minute()), (3, 30));
        assert_eq!(instant.year(), 2023);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text(r"Smith\, Jane (user)"), "Smith, Jane (user)");
        assert_eq!(unescape_text(r"a\;b\\c\nd"), "a;b\\c\nd");
        assert_eq!(unescape_text("plain"), "plain");
    }
}
