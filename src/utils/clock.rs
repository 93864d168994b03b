use chrono::{Local, NaiveDate};

/// Represents an entity responsible for resolving "today" across the application. This allows
/// tests to pin the calendar day.
pub trait Clock: Sync + Send + 'static {
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that always reports the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
