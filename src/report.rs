//! CSV rendering of the weekly roster comparison.

use crate::config::{Config, NameFixup};
use crate::roster::{week_start, AggregationResult};
use anyhow::{anyhow, Context, Result};
use log::debug;
use std::io::Write;

pub struct ReportRenderer<'a> {
    config: &'a Config,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Write the header and one row per primary week to `out`.
    ///
    /// Rows follow the primary schedule's week order; weeks missing from the
    /// secondary schedule get empty secondary fields.
    pub fn render<W: Write>(
        &self,
        primary: &AggregationResult,
        secondary: &AggregationResult,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "{}", format_record(&self.config.header)?)?;

        for week in primary.weeks() {
            let monday = week_start(*week)?;
            let mut fields = vec![monday.format("%Y-%m-%d").to_string()];
            fields.extend(self.roster_fields(primary.people(week)));
            fields.extend(self.roster_fields(secondary.people(week)));

            let row = apply_name_fixups(&format_record(&fields)?, &self.config.name_fixups);
            debug!("Week {}: {}", week, row);
            writeln!(out, "{}", row)?;
        }
        out.flush()?;
        Ok(())
    }

    /// The roster's people, padded with empty fields up to `roster_slots`.
    ///
    /// An empty roster always keeps at least one (empty) field.
    fn roster_fields(&self, people: &[String]) -> Vec<String> {
        let slots = self.config.roster_slots.max(1);
        let mut fields = people.to_vec();
        if fields.len() < slots {
            fields.resize(slots, String::new());
        }
        fields
    }
}

/// One CSV line without its terminator
fn format_record(fields: &[String]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields).context("Failed to format CSV row")?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV row: {}", e.error()))?;
    let line = String::from_utf8(bytes).context("CSV row is not valid UTF-8")?;
    Ok(line.trim_end_matches('\n').to_string())
}

/// Expand shortened names in a finished row.
///
/// A fixup is skipped when the row already contains the full name, so
/// `Joram Wilander` never turns into `Joram Wilander Wilander`.
pub fn apply_name_fixups(row: &str, fixups: &[NameFixup]) -> String {
    fixups.iter().fold(row.to_string(), |row, fixup| {
        if row.contains(&fixup.full) {
            row
        } else {
            row.replace(&fixup.short, &fixup.full)
        }
    })
}
