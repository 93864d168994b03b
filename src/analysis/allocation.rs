use serde::Serialize;

use crate::{
    ledger::category::Category,
    settings::{AllocationTargets, Settings},
    utils::percentage::ratio_percentage,
};

use super::aggregation::{CategoryHours, LedgerStatistics};

/// Below this many points a delta is shown as on target.
pub const DISPLAY_THRESHOLD: f64 = 3.;
/// From this many points a delta gets a written insight.
pub const INSIGHT_THRESHOLD: f64 = 5.;
/// Over/under-work smaller than this isn't worth mentioning.
const OVERWORK_INSIGHT_HOURS: f64 = 1.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayBand {
    OnTarget,
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAllocation {
    pub category: Category,
    pub hours: f64,
    /// Share of working hours, 0..=100.
    pub actual: f64,
    pub target: f64,
    /// `actual - target`. Positive means more time than planned went into the category.
    pub delta: f64,
}

impl CategoryAllocation {
    pub fn band(&self) -> DisplayBand {
        if self.delta.abs() < DISPLAY_THRESHOLD {
            DisplayBand::OnTarget
        } else if self.delta > 0. {
            DisplayBand::Above
        } else {
            DisplayBand::Below
        }
    }

    /// Whether the delta is large enough for [AllocationReport::insights].
    pub fn is_notable(&self) -> bool {
        self.delta.abs() >= INSIGHT_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    /// One entry per working category, in [Category::WORKING] order.
    pub categories: Vec<CategoryAllocation>,
    pub working_total: f64,
    pub total_hours: f64,
    /// `week_count * hours_per_week`.
    pub expected_hours: f64,
    pub carryover_hours: f64,
    /// Positive when more hours were worked than expected.
    pub over_under: f64,
    pub target_warning: Option<String>,
}

/// Actual share and delta per working category. All zeros when nothing was worked.
pub fn category_allocation(
    totals: &CategoryHours,
    targets: &AllocationTargets,
) -> Vec<CategoryAllocation> {
    let working_total = totals.working();
    Category::WORKING
        .into_iter()
        .map(|category| {
            let hours = totals.get(category);
            let target = *targets.get(category);
            let actual = ratio_percentage(hours, working_total);
            let delta = if working_total > 0. { actual - target } else { 0. };
            CategoryAllocation {
                category,
                hours,
                actual,
                target,
                delta,
            }
        })
        .collect()
}

pub fn over_under_work(
    total_hours: f64,
    week_count: usize,
    hours_per_week: f64,
    carryover_hours: f64,
) -> f64 {
    total_hours - week_count as f64 * hours_per_week + carryover_hours
}

pub fn analyze_allocation(stats: &LedgerStatistics, settings: &Settings) -> AllocationReport {
    let expected_hours = stats.week_count as f64 * settings.hours_per_week;
    AllocationReport {
        categories: category_allocation(&stats.category_totals, &settings.allocation),
        working_total: stats.working_total,
        total_hours: stats.total_hours,
        expected_hours,
        carryover_hours: settings.carryover_hours,
        over_under: over_under_work(
            stats.total_hours,
            stats.week_count,
            settings.hours_per_week,
            settings.carryover_hours,
        ),
        target_warning: settings.allocation.warning(),
    }
}

impl AllocationReport {
    /// Short written observations about the report.
    pub fn insights(&self) -> Vec<String> {
        let mut insights = vec![];
        if let Some(warning) = &self.target_warning {
            insights.push(warning.clone());
        }
        for allocation in self.categories.iter().filter(|a| a.is_notable()) {
            let direction = if allocation.delta > 0. {
                "above"
            } else {
                "below"
            };
            insights.push(format!(
                "{} is {:.1} points {direction} its {}% target",
                allocation.category,
                allocation.delta.abs(),
                allocation.target
            ));
        }
        if self.over_under >= OVERWORK_INSIGHT_HOURS {
            insights.push(format!(
                "You have worked {:.1} hours more than expected",
                self.over_under
            ));
        } else if self.over_under <= -OVERWORK_INSIGHT_HOURS {
            insights.push(format!(
                "You have worked {:.1} hours less than expected",
                -self.over_under
            ));
        }
        insights
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        analysis::aggregation::{CategoryHours, aggregate},
        ledger::{category::Category, entries::Ledger},
        settings::{AllocationTargets, Settings},
        utils::percentage::Percentage,
    };

    use super::{DisplayBand, analyze_allocation, category_allocation, over_under_work};

    fn targets(research: f64, teaching: f64, service: f64) -> AllocationTargets {
        AllocationTargets {
            research: Percentage::new_opt(research).unwrap(),
            teaching: Percentage::new_opt(teaching).unwrap(),
            service: Percentage::new_opt(service).unwrap(),
        }
    }

    #[test]
    fn test_allocation_deltas() {
        let totals = CategoryHours {
            research: 30.,
            teaching: 50.,
            service: 20.,
            other: 12.,
        };
        let allocation = category_allocation(&totals, &targets(40., 40., 20.));

        let actual = allocation.iter().map(|a| a.actual).collect::<Vec<_>>();
        let delta = allocation.iter().map(|a| a.delta).collect::<Vec<_>>();
        assert_eq!(actual, vec![30., 50., 20.]);
        assert_eq!(delta, vec![-10., 10., 0.]);
        assert_eq!(allocation[0].band(), DisplayBand::Below);
        assert_eq!(allocation[1].band(), DisplayBand::Above);
        assert_eq!(allocation[2].band(), DisplayBand::OnTarget);
    }

    #[test]
    fn test_no_working_hours_gives_zeros() {
        let totals = CategoryHours {
            other: 8.,
            ..Default::default()
        };
        let allocation = category_allocation(&totals, &targets(40., 40., 20.));
        for entry in allocation {
            assert_eq!(entry.actual, 0.);
            assert_eq!(entry.delta, 0.);
        }
    }

    #[test]
    fn test_thresholds_are_distinct() {
        // 4 points off: colored, but no written insight.
        let totals = CategoryHours {
            research: 44.,
            teaching: 36.,
            service: 20.,
            other: 0.,
        };
        let allocation = category_allocation(&totals, &targets(40., 40., 20.));
        assert_eq!(allocation[0].band(), DisplayBand::Above);
        assert!(!allocation[0].is_notable());

        let totals = CategoryHours {
            research: 45.,
            teaching: 35.,
            service: 20.,
            other: 0.,
        };
        let allocation = category_allocation(&totals, &targets(40., 40., 20.));
        assert!(allocation[0].is_notable());
        assert!(allocation[1].is_notable());
        assert!(!allocation[2].is_notable());
    }

    #[test]
    fn test_over_under_work() {
        assert_eq!(over_under_work(80., 2, 37.5, 0.), 5.);
        assert_eq!(over_under_work(70., 2, 37.5, -2.), -7.);
        assert_eq!(over_under_work(0., 0, 37.5, 3.), 3.);
    }

    #[test]
    fn test_report_insights() {
        let mut ledger = Ledger::default();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        ledger.set_hours(monday, Category::Research, "Writing", "30");
        ledger.set_hours(monday, Category::Teaching, "Delivery", "50");
        ledger.set_hours(monday, Category::Service, "Admin", "20");
        let settings = Settings {
            hours_per_week: 37.5,
            allocation: targets(40., 40., 20.),
            ..Default::default()
        };

        let report = analyze_allocation(&aggregate(&ledger), &settings);
        assert_eq!(report.over_under, 62.5);
        assert_eq!(report.expected_hours, 37.5);

        let insights = report.insights();
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0], "Research is 10.0 points below its 40% target");
        assert_eq!(insights[1], "Teaching is 10.0 points above its 40% target");
        assert!(insights[2].contains("62.5 hours more"));
    }
}
