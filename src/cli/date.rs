use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::utils::time::key_to_date;

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct DateArg {
    #[arg(
        long,
        short,
        help = "Day to use. Defaults to today. Examples are \"2025-03-10\", \"yesterday\", \"last friday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl DateArg {
    /// Resolves the argument to a calendar day, `today` when no date was given.
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        let Some(date) = self.date.as_deref() else {
            return Ok(today);
        };
        if let Ok(date) = key_to_date(date.trim()) {
            return Ok(date);
        }
        match parse_date_string(date, Local::now(), self.date_style.into()) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {date:?} {e}"),
                )
                .into()),
        }
    }
}
