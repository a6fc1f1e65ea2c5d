//! Core calendar types shared by the import and roster code.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc};

/// A single (possibly expanded) calendar occurrence.
///
/// `start` keeps the offset the event was written in, so date based
/// calculations see the event's own wall-clock day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub start: DateTime<FixedOffset>,
    pub summary: String,
}

impl Event {
    pub fn new(start: DateTime<FixedOffset>, summary: impl Into<String>) -> Self {
        Self { start, summary: summary.into() }
    }
}

/// Half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from midnight UTC of `date` up to `months` calendar months later.
    ///
    /// Overflowing days roll forward into the next month (Jul 31 + 7 months
    /// lands on Mar 2 or 3) instead of being clamped to the month end.
    pub fn months_from(date: NaiveDate, months: u32) -> Option<Self> {
        let end = add_months_normalized(date, months)?;
        Some(Self { start: midnight_utc(date)?, end: midnight_utc(end)? })
    }

    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.start <= instant && instant < self.end
    }

    /// True once `instant` is at or beyond the end of the window
    pub fn is_past<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        instant.with_timezone(&Utc) >= self.end
    }
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive))
}

pub(crate) fn add_months_normalized(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(date.day0())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test_case((2023, 1, 1), (2023, 8, 1) ; "plain seven months")]
    #[test_case((2023, 7, 31), (2024, 3, 2) ; "overflow rolls into march of a leap year")]
    #[test_case((2022, 7, 31), (2023, 3, 3) ; "overflow rolls into march")]
    #[test_case((2023, 6, 15), (2024, 1, 15) ; "crosses year end")]
    fn test_window_end(start: (i32, u32, u32), end: (i32, u32, u32)) {
        let window =
            Window::months_from(NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(), 7)
                .unwrap();
        assert_eq!(window.end, utc(end.0, end.1, end.2, 0));
    }

    #[test]
    fn test_window_is_half_open() {
        let window = Window::months_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 7).unwrap();
        assert!(window.contains(&utc(2023, 1, 1, 0)));
        assert!(window.contains(&utc(2023, 7, 31, 23)));
        assert!(!window.contains(&utc(2023, 8, 1, 0)));
        assert!(!window.contains(&utc(2022, 12, 31, 23)));
        assert!(window.is_past(&utc(2023, 8, 1, 0)));
    }

    #[test]
    fn test_window_compares_instants_across_offsets() {
        let window = Window::months_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 7).unwrap();
        // 2023-01-01 00:30 at +01:00 is still 2022 in UTC
        let early = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 1, 0, 30, 0)
            .unwrap();
        assert!(!window.contains(&early));
    }

    #[test]
    fn test_vec_source_filters_by_window() {
        use crate::calendar::EventSource;

        let offset = FixedOffset::east_opt(0).unwrap();
        let events = vec![
            Event::new(offset.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(), "In (user)"),
            Event::new(offset.with_ymd_and_hms(2023, 8, 1, 0, 0, 0).unwrap(), "Out (user)"),
        ];
        let window = Window::months_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 7).unwrap();
        let kept = events.events(&window).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].summary, "In (user)");
    }
}
