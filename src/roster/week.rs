use super::RosterError;
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// ISO-8601 week of an ISO week-numbering year.
///
/// Ordering is numeric on `(year, week)`, so `2023-9` sorts before `2023-10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// ISO week containing `date` (the ISO year may differ from the calendar year)
    pub fn from_date<D: Datelike>(date: &D) -> Self {
        let iso = date.iso_week();
        Self { year: iso.year(), week: iso.week() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RosterError::InvalidWeekKey(s.to_string());
        // rsplit keeps a leading minus sign on the year intact
        let (year, week) = s.rsplit_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;
        if !(1..=53).contains(&week) {
            return Err(invalid());
        }
        Ok(Self::new(year, week))
    }
}

/// Monday that starts the ISO week `key`.
///
/// Anchors on July 1 of the key's year, which always sits in the middle of
/// that ISO year, rolls back to its Monday and shifts by the week difference.
pub fn week_start(key: WeekKey) -> Result<NaiveDate, RosterError> {
    let out_of_range = || RosterError::OutOfRange(key);
    let anchor = NaiveDate::from_ymd_opt(key.year, 7, 1).ok_or_else(out_of_range)?;
    let monday = anchor
        .checked_sub_signed(Duration::days(i64::from(anchor.weekday().num_days_from_monday())))
        .ok_or_else(out_of_range)?;
    let current = monday.iso_week().week();
    let delta = (i64::from(key.week) - i64::from(current)) * 7;
    monday.checked_add_signed(Duration::days(delta)).ok_or_else(out_of_range)
}
