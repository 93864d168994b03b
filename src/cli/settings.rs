use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use crate::{
    settings::{parse_carryover, parse_weekly_hours, Settings},
    storage::{session::Session, store::StateStore},
    utils::{percentage::Percentage, time::date_to_key},
};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    #[command(about = "Print current settings")]
    Show,
    #[command(about = "Change one or more settings")]
    Set(SettingsUpdate),
}

#[derive(Debug, Default, Clone, clap::Args)]
pub struct SettingsUpdate {
    #[arg(long, value_parser = parse_weekly_hours, help = "Contracted hours per week")]
    hours_per_week: Option<f64>,
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = parse_carryover,
        help = "Hours carried over from earlier periods. Negative means owed hours"
    )]
    carryover: Option<f64>,
    #[arg(long, help = "Start of the working year, YYYY-MM-DD")]
    year_start: Option<NaiveDate>,
    #[arg(long, help = "Target share of working hours for Research, e.g. 40%")]
    research: Option<Percentage>,
    #[arg(long, help = "Target share of working hours for Teaching")]
    teaching: Option<Percentage>,
    #[arg(long, help = "Target share of working hours for Service")]
    service: Option<Percentage>,
    #[arg(long, help = "Report days without logged hours")]
    missing_enabled: Option<bool>,
    #[arg(long, help = "How many days to check for missing hours, 1 to 30")]
    missing_days: Option<u32>,
    #[arg(long, help = "Check weekends for missing hours")]
    include_weekends: Option<bool>,
    #[arg(long, help = "Endpoint used for remote sync")]
    sync_url: Option<String>,
    #[arg(long, conflicts_with = "sync_url", help = "Forget the sync endpoint")]
    clear_sync_url: bool,
}

impl SettingsUpdate {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = self.hours_per_week {
            settings.hours_per_week = v;
        }
        if let Some(v) = self.carryover {
            settings.carryover_hours = v;
        }
        if let Some(v) = self.year_start {
            settings.year_start = v;
        }
        if let Some(v) = self.research {
            settings.allocation.research = v;
        }
        if let Some(v) = self.teaching {
            settings.allocation.teaching = v;
        }
        if let Some(v) = self.service {
            settings.allocation.service = v;
        }
        if let Some(v) = self.missing_enabled {
            settings.missing_data.enabled = v;
        }
        if let Some(v) = self.missing_days {
            settings.missing_data.set_days(v);
        }
        if let Some(v) = self.include_weekends {
            settings.missing_data.include_weekends = v;
        }
    }
}

pub async fn process_settings_command<S: StateStore>(
    session: &mut Session<S>,
    command: SettingsCommand,
) -> Result<()> {
    match command {
        SettingsCommand::Show => {}
        SettingsCommand::Set(update) => {
            session.update_settings(|s| update.apply(s)).await?;
            if update.clear_sync_url {
                session.set_sync_url(None).await?;
            } else if update.sync_url.is_some() {
                session.set_sync_url(update.sync_url.clone()).await?;
            }
        }
    }
    let state = session.state();
    print!("{}", render_settings(&state.settings, state.sync_url.as_deref()));
    Ok(())
}

fn render_settings(settings: &Settings, sync_url: Option<&str>) -> String {
    let mut out = format!(
        "Hours per week\t{}\nCarryover\t{}\nYear start\t{}\nResearch\t{}\nTeaching\t{}\nService\t{}\n",
        settings.hours_per_week,
        settings.carryover_hours,
        date_to_key(settings.year_start),
        settings.allocation.research,
        settings.allocation.teaching,
        settings.allocation.service,
    );
    if let Some(warning) = settings.allocation.warning() {
        out += &format!("\t{warning}\n");
    }
    out += &format!(
        "Missing days\t{}\t{} days\tweekends {}\n",
        if settings.missing_data.enabled { "on" } else { "off" },
        settings.missing_data.days(),
        if settings.missing_data.include_weekends { "included" } else { "excluded" },
    );
    out += &format!("Sync url\t{}\n", sync_url.unwrap_or("-"));
    out
}

#[cfg(test)]
mod tests {
    use crate::{settings::Settings, utils::percentage::Percentage};

    use clap::Parser;

    use super::{SettingsCommand, SettingsUpdate, render_settings};

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(subcommand)]
        command: SettingsCommand,
    }

    #[test]
    fn test_update_only_touches_given_values() {
        let mut settings = Settings::default();
        let update = SettingsUpdate {
            carryover: Some(-6.5),
            service: Some(Percentage::new_opt(30.).unwrap()),
            missing_days: Some(100),
            ..Default::default()
        };
        update.apply(&mut settings);

        assert_eq!(settings.carryover_hours, -6.5);
        assert_eq!(settings.hours_per_week, Settings::default().hours_per_week);
        assert_eq!(settings.missing_data.days(), 30);

        let out = render_settings(&settings, None);
        assert!(out.contains("110%"));
        assert!(out.contains("Sync url\t-"));
    }

    #[test]
    fn test_non_finite_schedule_is_refused() {
        for args in [
            ["test", "set", "--carryover", "NaN"],
            ["test", "set", "--carryover", "-inf"],
            ["test", "set", "--hours-per-week", "inf"],
            ["test", "set", "--hours-per-week", "-5"],
        ] {
            assert!(TestArgs::try_parse_from(args).is_err(), "{args:?}");
        }

        let parsed = TestArgs::try_parse_from(["test", "set", "--carryover", "-3.5"]).unwrap();
        let SettingsCommand::Set(update) = parsed.command else {
            panic!("expected set");
        };
        assert_eq!(update.carryover, Some(-3.5));
    }
}
