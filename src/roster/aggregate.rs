use super::{extract_with_marker, WeekKey, PERSON_MARKER};
use crate::calendar::Event;
use log::debug;
use std::collections::HashMap;

/// People on call per ISO week, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    weeks: HashMap<WeekKey, Vec<String>>,
}

impl Roster {
    /// People for `key`; empty when nobody was scheduled that week
    pub fn people(&self, key: &WeekKey) -> &[String] {
        self.weeks.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    fn insert(&mut self, key: WeekKey, person: &str) {
        let people = self.weeks.entry(key).or_default();
        if !people.iter().any(|p| p == person) {
            people.push(person.to_string());
        }
    }
}

/// A roster plus its weeks in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    roster: Roster,
    weeks: Vec<WeekKey>,
}

impl AggregationResult {
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Weeks present in the roster, sorted
    pub fn weeks(&self) -> &[WeekKey] {
        &self.weeks
    }

    pub fn people(&self, key: &WeekKey) -> &[String] {
        self.roster.people(key)
    }
}

/// Fold events into weekly rosters using the default `" (user)"` marker
pub fn aggregate<'a, I>(events: I) -> AggregationResult
where
    I: IntoIterator<Item = &'a Event>,
{
    aggregate_with_marker(events, PERSON_MARKER)
}

pub fn aggregate_with_marker<'a, I>(events: I, marker: &str) -> AggregationResult
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut roster = Roster::default();
    for event in events {
        let key = WeekKey::from_date(&event.start);
        roster.insert(key, extract_with_marker(&event.summary, marker));
    }

    let mut weeks: Vec<WeekKey> = roster.weeks.keys().copied().collect();
    weeks.sort_unstable();
    debug!("Aggregated {} weeks", weeks.len());

    AggregationResult { roster, weeks }
}
