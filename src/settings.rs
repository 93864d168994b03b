//! User configuration. Persisted as part of [AppState](crate::storage::state::AppState), every
//! field falls back to its default when missing.

use chrono::{Datelike, Local, NaiveDate};
use serde::{de::Error, Deserialize, Serialize};

use crate::{
    ledger::{category::Category, error::LedgerError},
    utils::percentage::Percentage,
};

pub const MIN_MISSING_WINDOW: u32 = 1;
pub const MAX_MISSING_WINDOW: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Contracted paid hours per week. Finite and not negative.
    #[serde(deserialize_with = "de_weekly_hours")]
    pub hours_per_week: f64,
    /// Signed adjustment applied once to the over/under-work figure.
    #[serde(deserialize_with = "de_carryover")]
    pub carryover_hours: f64,
    /// Start of the working year. Stored for period-bounded analysis, not used by the totals.
    pub year_start: NaiveDate,
    pub allocation: AllocationTargets,
    pub missing_data: MissingDataPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hours_per_week: 37.5,
            carryover_hours: 0.,
            year_start: NaiveDate::from_ymd_opt(Local::now().year(), 1, 1)
                .unwrap_or(NaiveDate::MIN),
            allocation: AllocationTargets::default(),
            missing_data: MissingDataPolicy::default(),
        }
    }
}

impl Settings {
    /// Checks the schedule values that can't be expressed by their types.
    pub fn validate(&self) -> Result<(), LedgerError> {
        check_weekly_hours(self.hours_per_week)?;
        check_carryover(self.carryover_hours)?;
        Ok(())
    }
}

fn check_weekly_hours(value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() && value >= 0. {
        Ok(value)
    } else {
        Err(LedgerError::Schedule(format!(
            "{value} hours per week, expected a non-negative number"
        )))
    }
}

fn check_carryover(value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LedgerError::Schedule(format!(
            "{value} carryover hours, expected a finite number"
        )))
    }
}

/// Clap value parser for `--hours-per-week`.
pub fn parse_weekly_hours(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    check_weekly_hours(value).map_err(|e| e.to_string())
}

/// Clap value parser for `--carryover`.
pub fn parse_carryover(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    check_carryover(value).map_err(|e| e.to_string())
}

fn de_weekly_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    check_weekly_hours(value).map_err(Error::custom)
}

fn de_carryover<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    check_carryover(value).map_err(Error::custom)
}

/// Target share of working hours per working category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationTargets {
    pub research: Percentage,
    pub teaching: Percentage,
    pub service: Percentage,
}

impl Default for AllocationTargets {
    fn default() -> Self {
        Self {
            research: Percentage::new_opt(40.).unwrap_or_default(),
            teaching: Percentage::new_opt(40.).unwrap_or_default(),
            service: Percentage::new_opt(20.).unwrap_or_default(),
        }
    }
}

impl AllocationTargets {
    /// Target for `category`. [Category::Other] has no target.
    pub fn get(&self, category: Category) -> Percentage {
        match category {
            Category::Research => self.research,
            Category::Teaching => self.teaching,
            Category::Service => self.service,
            Category::Other => Percentage::ZERO,
        }
    }

    /// Returns false when `category` can't carry a target.
    pub fn set(&mut self, category: Category, value: Percentage) -> bool {
        match category {
            Category::Research => self.research = value,
            Category::Teaching => self.teaching = value,
            Category::Service => self.service = value,
            Category::Other => return false,
        }
        true
    }

    pub fn sum(&self) -> f64 {
        Category::WORKING.into_iter().map(|c| *self.get(c)).sum()
    }

    /// Targets are expected to add up to 100 but nothing enforces it.
    pub fn warning(&self) -> Option<String> {
        let sum = self.sum();
        if (sum - 100.).abs() > 1e-9 {
            Some(format!("Allocation targets add up to {sum}% instead of 100%"))
        } else {
            None
        }
    }
}

/// Controls which recent days are reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingDataPolicy {
    pub enabled: bool,
    /// Number of days scanned. Always within 1..=30.
    #[serde(deserialize_with = "de_window")]
    days: u32,
    pub include_weekends: bool,
}

impl Default for MissingDataPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            days: 7,
            include_weekends: false,
        }
    }
}

impl MissingDataPolicy {
    pub fn new(enabled: bool, days: u32, include_weekends: bool) -> Self {
        Self {
            enabled,
            days: clamp_window(days),
            include_weekends,
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn set_days(&mut self, days: u32) {
        self.days = clamp_window(days);
    }
}

fn clamp_window(days: u32) -> u32 {
    days.clamp(MIN_MISSING_WINDOW, MAX_MISSING_WINDOW)
}

fn de_window<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_window)
}

#[cfg(test)]
mod tests {
    use crate::{ledger::category::Category, utils::percentage::Percentage};

    use super::{
        parse_carryover, parse_weekly_hours, AllocationTargets, MissingDataPolicy, Settings,
    };

    #[test]
    fn test_allocation_warning() {
        let mut targets = AllocationTargets::default();
        assert_eq!(targets.warning(), None);
        targets.set(Category::Service, Percentage::new_opt(30.).unwrap());
        assert!(targets.warning().unwrap().contains("110"));
        assert!(!targets.set(Category::Other, Percentage::ZERO));
    }

    #[test]
    fn test_missing_window_is_clamped() {
        assert_eq!(MissingDataPolicy::new(true, 0, false).days(), 1);
        assert_eq!(MissingDataPolicy::new(true, 90, false).days(), 30);

        let policy: MissingDataPolicy = serde_json::from_str(r#"{"days": 45}"#).unwrap();
        assert_eq!(policy.days(), 30);
        assert!(policy.enabled);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"hours_per_week": 30}"#).unwrap();
        assert_eq!(settings.hours_per_week, 30.);
        assert_eq!(settings.allocation, AllocationTargets::default());
        assert_eq!(settings.carryover_hours, 0.);
    }

    #[test]
    fn test_negative_target_is_rejected() {
        let result = serde_json::from_str::<AllocationTargets>(r#"{"research": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_must_be_finite() {
        for raw in ["NaN", "inf", "-inf", "-40", "forty"] {
            assert!(parse_weekly_hours(raw).is_err(), "{raw}");
        }
        assert_eq!(parse_weekly_hours(" 30 "), Ok(30.));
        assert_eq!(parse_weekly_hours("0"), Ok(0.));

        for raw in ["NaN", "inf", "-inf"] {
            assert!(parse_carryover(raw).is_err(), "{raw}");
        }
        assert_eq!(parse_carryover("-6.5"), Ok(-6.5));

        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.carryover_hours = f64::NAN;
        assert!(settings.validate().is_err());
        settings.carryover_hours = 0.;
        settings.hours_per_week = f64::INFINITY;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_weekly_hours_are_rejected() {
        assert!(serde_json::from_str::<Settings>(r#"{"hours_per_week": -40}"#).is_err());
        assert!(serde_json::from_str::<Settings>(r#"{"carryover_hours": null}"#).is_err());
        let settings: Settings = serde_json::from_str(r#"{"carryover_hours": -12}"#).unwrap();
        assert_eq!(settings.carryover_hours, -12.);
    }
}
