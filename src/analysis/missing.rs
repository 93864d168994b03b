use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{instrument, trace};

use crate::{
    ledger::entries::Ledger,
    settings::MissingDataPolicy,
    utils::time::{format_short, is_weekend},
};

/// Hard limit on how far back the walk goes, whatever the policy says.
const MAX_LOOKBACK_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDay {
    pub date: NaiveDate,
    pub label: String,
    pub is_weekend: bool,
}

/// Walks backwards from the day before `today` and reports scanned days without any hours.
///
/// Skipped weekend days don't use up the window. The result is newest first.
#[instrument(skip(ledger))]
pub fn find_missing_days(
    ledger: &Ledger,
    policy: &MissingDataPolicy,
    today: NaiveDate,
) -> Vec<MissingDay> {
    if !policy.enabled {
        return vec![];
    }

    let mut missing = vec![];
    let mut scanned = 0;
    for age in 1..=MAX_LOOKBACK_DAYS {
        if scanned >= policy.days() {
            break;
        }
        let Some(day) = today.checked_sub_signed(Duration::days(age)) else {
            break;
        };
        let weekend = is_weekend(day);
        if weekend && !policy.include_weekends {
            trace!("Skipping weekend day {day}");
            continue;
        }
        scanned += 1;
        if ledger.day_total(day) == 0. {
            missing.push(MissingDay {
                date: day,
                label: format_short(day),
                is_weekend: weekend,
            });
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        ledger::{category::Category, entries::Ledger},
        settings::MissingDataPolicy,
    };

    use super::find_missing_days;

    const MONDAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
    const THURSDAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 13).unwrap();
    const FRIDAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    const WEDNESDAY: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();

    #[test]
    fn test_weekends_skipped_without_using_window() {
        let mut ledger = Ledger::default();
        ledger.set_hours(WEDNESDAY, Category::Research, "Writing", "6");

        let policy = MissingDataPolicy::new(true, 3, false);
        let missing = find_missing_days(&ledger, &policy, MONDAY);

        let dates = missing.iter().map(|m| m.date).collect::<Vec<_>>();
        assert_eq!(dates, vec![FRIDAY, THURSDAY]);
        assert!(missing.iter().all(|m| !m.is_weekend));
        assert_eq!(missing[0].label, "Fri 14 Mar");
    }

    #[test]
    fn test_weekends_included() {
        let ledger = Ledger::default();
        let policy = MissingDataPolicy::new(true, 3, true);
        let missing = find_missing_days(&ledger, &policy, MONDAY);

        assert_eq!(missing.len(), 3);
        assert_eq!(missing[0].date, NaiveDate::from_ymd_opt(2025, 3, 16).unwrap());
        assert!(missing[0].is_weekend);
        assert!(missing[1].is_weekend);
        assert_eq!(missing[2].date, FRIDAY);
    }

    #[test]
    fn test_today_is_never_missing() {
        let mut ledger = Ledger::default();
        ledger.set_hours(FRIDAY, Category::Service, "Admin", "1");
        let policy = MissingDataPolicy::new(true, 1, true);
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert!(find_missing_days(&ledger, &policy, saturday).is_empty());
    }

    #[test]
    fn test_disabled_policy() {
        let policy = MissingDataPolicy::new(false, 30, true);
        assert!(find_missing_days(&Ledger::default(), &policy, MONDAY).is_empty());
    }

    #[test]
    fn test_zeroed_day_counts_as_missing() {
        let mut ledger = Ledger::default();
        ledger.set_hours(FRIDAY, Category::Teaching, "Marking", "2");
        ledger.set_hours(FRIDAY, Category::Teaching, "Marking", "0");
        let policy = MissingDataPolicy::new(true, 1, false);
        let missing = find_missing_days(&ledger, &policy, MONDAY);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].date, FRIDAY);
    }
}
