use chrono::{Datelike, Duration, NaiveDate, ParseResult, Weekday};

/// This is the standard way of converting a date to a ledger key in allotime.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn key_to_date(key: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
}

/// Returns the Monday on or before `date`. Sunday is the last day of its own week.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Returns the 7 days of the Monday-started week containing `date`.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(date);
    std::array::from_fn(|offset| start + Duration::days(offset as i64))
}

/// Short label such as "Mon 10 Mar". Always uses English abbreviations.
pub fn format_short(date: NaiveDate) -> String {
    date.format("%a %-d %b").to_string()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
