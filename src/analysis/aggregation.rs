use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::{instrument, trace};

use crate::{
    ledger::{category::Category, entries::Ledger},
    utils::{percentage::safe_div, time::week_start},
};

/// Hours per [Category].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryHours {
    pub research: f64,
    pub teaching: f64,
    pub service: f64,
    pub other: f64,
}

impl CategoryHours {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Research => self.research,
            Category::Teaching => self.teaching,
            Category::Service => self.service,
            Category::Other => self.other,
        }
    }

    fn slot(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Research => &mut self.research,
            Category::Teaching => &mut self.teaching,
            Category::Service => &mut self.service,
            Category::Other => &mut self.other,
        }
    }

    pub fn add(&mut self, category: Category, hours: f64) {
        *self.slot(category) += hours;
    }

    /// Research + Teaching + Service, leave excluded.
    pub fn working(&self) -> f64 {
        Category::WORKING.into_iter().map(|c| self.get(c)).sum()
    }

    pub fn total(&self) -> f64 {
        Category::ALL.into_iter().map(|c| self.get(c)).sum()
    }
}

/// Hours of a Monday-started week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub hours: CategoryHours,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    /// Number of active dates that fall on this weekday.
    pub days: usize,
    pub average: f64,
}

/// Everything derived from a [Ledger] snapshot. Only active dates (total > 0) take part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStatistics {
    pub active_dates: Vec<NaiveDate>,
    pub category_totals: CategoryHours,
    pub working_total: f64,
    /// Sorted by week start.
    pub weeks: Vec<WeekSummary>,
    /// Monday first.
    pub weekday_averages: Vec<WeekdayAverage>,
    pub total_hours: f64,
    pub week_count: usize,
    pub active_days: usize,
    pub average_per_week: f64,
    pub average_per_day: f64,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Dates whose total is strictly positive, ascending.
pub fn active_dates(ledger: &Ledger) -> Vec<NaiveDate> {
    ledger.dates().filter(|d| ledger.day_total(*d) > 0.).collect()
}

/// Rolls up active dates into weeks keyed by their Monday.
pub fn weekly_rollup(ledger: &Ledger, active_dates: &[NaiveDate]) -> Vec<WeekSummary> {
    let mut weeks = BTreeMap::<NaiveDate, CategoryHours>::new();
    for date in active_dates {
        let week = weeks.entry(week_start(*date)).or_default();
        for category in Category::ALL {
            week.add(category, ledger.category_total(*date, category));
        }
    }
    weeks
        .into_iter()
        .map(|(week_start, hours)| WeekSummary {
            week_start,
            total: hours.total(),
            hours,
        })
        .collect()
}

pub fn weekday_averages(ledger: &Ledger, active_dates: &[NaiveDate]) -> Vec<WeekdayAverage> {
    let mut sums = [(0usize, 0f64); 7];
    for date in active_dates {
        let (count, sum) = &mut sums[date.weekday().num_days_from_monday() as usize];
        *count += 1;
        *sum += ledger.day_total(*date);
    }
    WEEK.into_iter()
        .zip(sums)
        .map(|(weekday, (days, sum))| WeekdayAverage {
            weekday,
            days,
            average: safe_div(sum, days as f64),
        })
        .collect()
}

/// Recomputes all statistics. Pure, nothing is cached between calls.
#[instrument(skip(ledger))]
pub fn aggregate(ledger: &Ledger) -> LedgerStatistics {
    let active_dates = active_dates(ledger);

    let mut category_totals = CategoryHours::default();
    let mut total_hours = 0.;
    for date in &active_dates {
        for category in Category::ALL {
            category_totals.add(category, ledger.category_total(*date, category));
        }
        total_hours += ledger.day_total(*date);
    }

    let weeks = weekly_rollup(ledger, &active_dates);
    let weekday_averages = weekday_averages(ledger, &active_dates);
    let week_count = weeks.len();
    let active_days = active_dates.len();
    trace!("Aggregated {active_days} days in {week_count} weeks");

    LedgerStatistics {
        working_total: category_totals.working(),
        category_totals,
        weeks,
        weekday_averages,
        total_hours,
        week_count,
        active_days,
        average_per_week: safe_div(total_hours, week_count as f64),
        average_per_day: safe_div(total_hours, active_days as f64),
        active_dates,
    }
}
