use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{category::Category, error::LedgerError};

/// Hours logged on a single day, by category and task.
pub type DayEntries = BTreeMap<Category, BTreeMap<String, f64>>;

/// Sparse map of logged hours keyed by calendar day.
///
/// Writing 0 (or anything that isn't a positive finite number) removes the cell, and a day or
/// category left without cells is pruned. A logged zero is therefore indistinguishable from
/// never having logged anything, which is what every statistic expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<NaiveDate, DayEntries>",
    into = "BTreeMap<NaiveDate, DayEntries>"
)]
pub struct Ledger {
    days: BTreeMap<NaiveDate, DayEntries>,
}

/// One nonzero `(date, category, task)` cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell<'a> {
    pub date: NaiveDate,
    pub category: Category,
    pub task: &'a str,
    pub hours: f64,
}

/// Parses user input into an hour quantity.
pub fn parse_hours(raw: &str) -> Result<f64, LedgerError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| LedgerError::Validation(raw.to_string()))?;
    if !value.is_finite() || value < 0. {
        return Err(LedgerError::Validation(raw.to_string()));
    }
    Ok(value)
}

impl Ledger {
    /// Parses `raw` and stores it. Invalid input is stored as 0, which clears the cell.
    /// Returns the value that ended up in the ledger.
    pub fn set_hours(&mut self, date: NaiveDate, category: Category, task: &str, raw: &str) -> f64 {
        let hours = parse_hours(raw).unwrap_or_else(|e| {
            debug!("{e}, storing 0 for {date} {category} {task:?}");
            0.
        });
        self.set_hours_value(date, category, task, hours)
    }

    /// Task names are trimmed the same way [Taxonomy](super::taxonomy::Taxonomy) trims them.
    pub fn set_hours_value(
        &mut self,
        date: NaiveDate,
        category: Category,
        task: &str,
        hours: f64,
    ) -> f64 {
        let task = task.trim();
        if hours.is_finite() && hours > 0. {
            self.days
                .entry(date)
                .or_default()
                .entry(category)
                .or_default()
                .insert(task.to_string(), hours);
            return hours;
        }

        if let Some(day) = self.days.get_mut(&date) {
            if let Some(tasks) = day.get_mut(&category) {
                tasks.remove(task);
                if tasks.is_empty() {
                    day.remove(&category);
                }
            }
            if day.is_empty() {
                self.days.remove(&date);
            }
        }
        0.
    }

    pub fn get_hours(&self, date: NaiveDate, category: Category, task: &str) -> f64 {
        self.days
            .get(&date)
            .and_then(|day| day.get(&category))
            .and_then(|tasks| tasks.get(task.trim()))
            .copied()
            .unwrap_or(0.)
    }

    pub fn category_total(&self, date: NaiveDate, category: Category) -> f64 {
        self.days
            .get(&date)
            .and_then(|day| day.get(&category))
            .map(|tasks| tasks.values().sum())
            .unwrap_or(0.)
    }

    pub fn day_total(&self, date: NaiveDate) -> f64 {
        Category::ALL
            .into_iter()
            .map(|c| self.category_total(date, c))
            .sum()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayEntries> {
        self.days.get(&date)
    }

    /// Dates with at least one cell, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Every nonzero cell, dates ascending, then category and task order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        self.days.iter().flat_map(|(date, day)| {
            day.iter().flat_map(move |(category, tasks)| {
                tasks.iter().map(move |(task, hours)| Cell {
                    date: *date,
                    category: *category,
                    task,
                    hours: *hours,
                })
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl From<Ledger> for BTreeMap<NaiveDate, DayEntries> {
    fn from(value: Ledger) -> Self {
        value.days
    }
}

impl TryFrom<BTreeMap<NaiveDate, DayEntries>> for Ledger {
    type Error = LedgerError;

    fn try_from(days: BTreeMap<NaiveDate, DayEntries>) -> Result<Self, Self::Error> {
        let mut ledger = Ledger::default();
        for (date, day) in days {
            for (category, tasks) in day {
                for (task, hours) in tasks {
                    if !hours.is_finite() || hours < 0. {
                        return Err(LedgerError::Validation(format!(
                            "{hours} for {date} {category} {task}"
                        )));
                    }
                    ledger.set_hours_value(date, category, &task, hours);
                }
            }
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::ledger::{category::Category, error::LedgerError};

    use super::{Ledger, parse_hours};

    const DAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    const NEXT_DAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

    fn sample() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.set_hours(DAY, Category::Research, "Writing", "4");
        ledger.set_hours(DAY, Category::Teaching, "Delivery", "3");
        ledger.set_hours(NEXT_DAY, Category::Service, "Admin", "2");
        ledger
    }

    #[test]
    fn test_empty_day_is_zero() {
        let ledger = sample();
        let empty = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(ledger.day_total(empty), 0.);
        for category in Category::ALL {
            assert_eq!(ledger.category_total(empty, category), 0.);
        }
        assert_eq!(ledger.get_hours(empty, Category::Research, "Writing"), 0.);
        assert_eq!(ledger.get_hours(DAY, Category::Research, "Unknown"), 0.);
    }

    #[test]
    fn test_totals() {
        let ledger = sample();
        assert_eq!(ledger.day_total(DAY), 7.);
        assert_eq!(ledger.category_total(DAY, Category::Research), 4.);
        assert_eq!(ledger.category_total(NEXT_DAY, Category::Service), 2.);
        for date in [DAY, NEXT_DAY] {
            let by_category: f64 = Category::ALL
                .into_iter()
                .map(|c| ledger.category_total(date, c))
                .sum();
            assert_eq!(ledger.day_total(date), by_category);
        }
    }

    #[test]
    fn test_set_hours_clamps_invalid_input() {
        let mut ledger = Ledger::default();
        let cases = [
            ("2.5", 2.5),
            (" 1.25 ", 1.25),
            ("-3", 0.),
            ("abc", 0.),
            ("", 0.),
            ("NaN", 0.),
            ("inf", 0.),
            ("0", 0.),
        ];
        for (raw, expected) in cases {
            assert_eq!(ledger.set_hours(DAY, Category::Other, "Training", raw), expected);
            assert_eq!(
                ledger.get_hours(DAY, Category::Other, "Training"),
                expected,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_zero_removes_cell_and_prunes_day() {
        let mut ledger = sample();
        ledger.set_hours(NEXT_DAY, Category::Service, "Admin", "0");
        assert!(ledger.day(NEXT_DAY).is_none());
        assert_eq!(ledger.dates().collect::<Vec<_>>(), vec![DAY]);

        ledger.set_hours(DAY, Category::Teaching, "Delivery", "-1");
        let day = ledger.day(DAY).unwrap();
        assert!(!day.contains_key(&Category::Teaching));
    }

    #[test]
    fn test_task_names_are_trimmed() {
        let mut ledger = sample();
        assert_eq!(ledger.set_hours(DAY, Category::Research, " Writing ", "5"), 5.);
        assert_eq!(ledger.get_hours(DAY, Category::Research, "Writing"), 5.);
        assert_eq!(ledger.get_hours(DAY, Category::Research, "Writing  "), 5.);
        assert_eq!(ledger.day(DAY).unwrap()[&Category::Research].len(), 1);
        assert_eq!(ledger.day_total(DAY), 8.);
    }

    #[test]
    fn test_cells_are_sorted_by_date() {
        let mut ledger = sample();
        ledger.set_hours(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Category::Other,
            "Annual leave",
            "8",
        );
        let dates = ledger.cells().map(|c| c.date).collect::<Vec<_>>();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(dates.len(), 4);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("3.5"), Ok(3.5));
        assert_eq!(parse_hours("-1"), Err(LedgerError::Validation("-1".into())));
    }

    #[test]
    fn test_deserialize_rejects_negative_and_drops_zero() {
        let ledger: Ledger = serde_json::from_str(
            r#"{"2025-03-10": {"Research": {"Writing": 4, "Reading": 0}}}"#,
        )
        .unwrap();
        assert_eq!(ledger.cells().count(), 1);
        assert_eq!(ledger.get_hours(DAY, Category::Research, "Writing"), 4.);

        let negative =
            serde_json::from_str::<Ledger>(r#"{"2025-03-10": {"Research": {"Writing": -4}}}"#);
        assert!(negative.is_err());
    }
}
