//! Tabular projections of the ledger, written as CSV.

use std::io;

use anyhow::Result;
use serde::Serialize;

use crate::{
    analysis::aggregation::LedgerStatistics, ledger::entries::Ledger, utils::time::date_to_key,
};

pub const DETAILED_HEADER: [&str; 5] = ["Date", "Weekday", "Category", "Task", "Hours"];
pub const WEEKLY_HEADER: [&str; 6] = [
    "WeekStart",
    "ResearchHours",
    "TeachingHours",
    "ServiceHours",
    "OtherHours",
    "TotalHours",
];

/// One row per nonzero cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedRow {
    pub date: String,
    pub weekday: String,
    pub category: String,
    pub task: String,
    pub hours: f64,
}

/// One row per week, hours fixed to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRow {
    pub week_start: String,
    pub research: String,
    pub teaching: String,
    pub service: String,
    pub other: String,
    pub total: String,
}

pub fn detailed_rows(ledger: &Ledger) -> Vec<DetailedRow> {
    ledger
        .cells()
        .map(|cell| DetailedRow {
            date: date_to_key(cell.date),
            weekday: cell.date.format("%A").to_string(),
            category: cell.category.to_string(),
            task: cell.task.to_string(),
            hours: cell.hours,
        })
        .collect()
}

pub fn weekly_rows(stats: &LedgerStatistics) -> Vec<WeeklyRow> {
    stats
        .weeks
        .iter()
        .map(|week| WeeklyRow {
            week_start: date_to_key(week.week_start),
            research: format!("{:.2}", week.hours.research),
            teaching: format!("{:.2}", week.hours.teaching),
            service: format!("{:.2}", week.hours.service),
            other: format!("{:.2}", week.hours.other),
            total: format!("{:.2}", week.total),
        })
        .collect()
}

/// Writes `header` followed by `rows`. The header is written even when there are no rows.
pub fn write_csv<W: io::Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
