//! Turns analysis results into the text printed by the cli.

use std::fmt::{self, Write};

use ansi_term::Colour;
use chrono::NaiveDate;

use crate::{
    analysis::{
        aggregation::LedgerStatistics,
        allocation::{AllocationReport, DisplayBand},
        missing::MissingDay,
    },
    ledger::{category::Category, entries::Ledger, taxonomy::Taxonomy},
    settings::Settings,
    utils::time::{date_to_key, format_short, week_dates},
};

pub fn format_hours(hours: f64) -> String {
    format!("{hours:.2}h")
}

pub fn render_day(
    ledger: &Ledger,
    taxonomy: &Taxonomy,
    date: NaiveDate,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}\t{}", date_to_key(date), format_short(date))?;
    for category in Category::ALL {
        let total = ledger.category_total(date, category);
        writeln!(out, "{category}\t{}", format_hours(total))?;

        // Tasks removed from the taxonomy still show up while they hold hours.
        let mut tasks = taxonomy.tasks(category).to_vec();
        if let Some(logged) = ledger.day(date).and_then(|day| day.get(&category)) {
            let orphaned = logged
                .keys()
                .filter(|t| !tasks.contains(*t))
                .cloned()
                .collect::<Vec<_>>();
            tasks.extend(orphaned);
        }
        for task in tasks {
            let hours = ledger.get_hours(date, category, &task);
            if hours > 0. {
                writeln!(out, "\t{task}\t{}", format_hours(hours))?;
            }
        }
    }
    writeln!(out, "Total\t{}", format_hours(ledger.day_total(date)))?;
    writeln!(out)?;
    for day in week_dates(date) {
        let marker = if day == date { "*" } else { "" };
        writeln!(
            out,
            "{marker}{}\t{}",
            format_short(day),
            format_hours(ledger.day_total(day))
        )?;
    }
    Ok(out)
}

pub fn render_statistics(stats: &LedgerStatistics) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Total\t{}", format_hours(stats.total_hours))?;
    writeln!(out, "Working\t{}", format_hours(stats.working_total))?;
    for category in Category::ALL {
        writeln!(
            out,
            "{category}\t{}",
            format_hours(stats.category_totals.get(category))
        )?;
    }
    writeln!(
        out,
        "Days\t{}\tWeeks\t{}",
        stats.active_days, stats.week_count
    )?;
    writeln!(
        out,
        "Per day\t{}\tPer week\t{}",
        format_hours(stats.average_per_day),
        format_hours(stats.average_per_week)
    )?;

    writeln!(out)?;
    writeln!(out, "Week\tResearch\tTeaching\tService\tOther\tTotal")?;
    for week in &stats.weeks {
        writeln!(
            out,
            "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            date_to_key(week.week_start),
            week.hours.research,
            week.hours.teaching,
            week.hours.service,
            week.hours.other,
            week.total
        )?;
    }

    writeln!(out)?;
    for average in &stats.weekday_averages {
        writeln!(
            out,
            "{}\t{}\t{} days",
            average.weekday,
            format_hours(average.average),
            average.days
        )?;
    }
    Ok(out)
}

fn paint_delta(band: DisplayBand, text: String) -> String {
    match band {
        DisplayBand::OnTarget => text,
        DisplayBand::Above => Colour::Red.paint(text).to_string(),
        DisplayBand::Below => Colour::Yellow.paint(text).to_string(),
    }
}

pub fn render_allocation(
    report: &AllocationReport,
    settings: &Settings,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Category\tHours\tActual\tTarget\tDelta")?;
    for allocation in &report.categories {
        let delta = paint_delta(allocation.band(), format!("{:+.1}", allocation.delta));
        writeln!(
            out,
            "{}\t{}\t{:.1}%\t{}%\t{delta}",
            allocation.category,
            format_hours(allocation.hours),
            allocation.actual,
            allocation.target,
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Expected\t{}\t({} per week)",
        format_hours(report.expected_hours),
        format_hours(settings.hours_per_week)
    )?;
    writeln!(out, "Carryover\t{}", format_hours(report.carryover_hours))?;
    let over_under = format!("{:+.2}h", report.over_under);
    let over_under = if report.over_under < 0. {
        Colour::Yellow.paint(over_under).to_string()
    } else {
        over_under
    };
    writeln!(out, "Over/under\t{over_under}")?;

    let insights = report.insights();
    if !insights.is_empty() {
        writeln!(out)?;
        for insight in insights {
            writeln!(out, "- {insight}")?;
        }
    }
    Ok(out)
}

pub fn render_missing(missing: &[MissingDay]) -> Result<String, fmt::Error> {
    if missing.is_empty() {
        return Ok("No missing days\n".to_string());
    }
    let mut out = String::new();
    for day in missing {
        let weekend = if day.is_weekend { "\tweekend" } else { "" };
        writeln!(out, "{}\t{}{weekend}", date_to_key(day.date), day.label)?;
    }
    Ok(out)
}

pub fn render_taxonomy(taxonomy: &Taxonomy) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for category in Category::ALL {
        writeln!(out, "{category}")?;
        for task in taxonomy.tasks(category) {
            writeln!(out, "\t{task}")?;
        }
    }
    Ok(out)
}
