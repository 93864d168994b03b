pub mod date;
pub mod report;
pub mod settings;

use std::{fs::File, io, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use date::DateArg;
use settings::{process_settings_command, SettingsCommand};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    export::{detailed_rows, weekly_rows, write_csv, DETAILED_HEADER, WEEKLY_HEADER},
    ledger::category::Category,
    storage::{
        session::Session,
        store::{JsonStateStore, StateStore},
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir, STATE_FILE_NAME},
        logging::{enable_logging, CLI_PREFIX},
        time::date_to_key,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Allotime", version, long_about = None)]
#[command(about = "Log daily hours against work categories and compare them with a target allocation", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Set hours for a task on a day. 0 clears the entry")]
    Log {
        category: Category,
        task: String,
        #[arg(allow_hyphen_values = true)]
        hours: String,
        #[command(flatten)]
        date: DateArg,
    },
    #[command(about = "Show hours logged on a day and its week")]
    Day {
        #[command(flatten)]
        date: DateArg,
    },
    #[command(about = "Manage the tasks available in each category")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    #[command(about = "Totals, weekly rollup and weekday averages")]
    Stats,
    #[command(about = "Compare time spent with the target allocation")]
    Allocation,
    #[command(about = "List recent days without logged hours")]
    Missing,
    #[command(about = "Export the ledger as CSV")]
    Export {
        kind: ExportKind,
        #[arg(long, short, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Import a JSON state file. Only fields present in the file are replaced")]
    Import { path: PathBuf },
    #[command(about = "View or change settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    #[command(about = "List tasks per category")]
    List,
    #[command(about = "Add a task to a category")]
    Add { category: Category, name: String },
    #[command(about = "Remove a task. Hours already logged against it are kept")]
    Remove { category: Category, name: String },
    #[command(about = "Restore the default task lists")]
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    /// One row per logged task and day.
    Detailed,
    /// One row per week.
    Weekly,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let store = JsonStateStore::new(app_dir.join(STATE_FILE_NAME));
    let mut session = Session::open(store, Box::new(DefaultClock)).await?;

    process_command(&mut session, args.commands).await
}

async fn process_command<S: StateStore>(session: &mut Session<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Log {
            category,
            task,
            hours,
            date,
        } => {
            let date = date.resolve(session.today())?;
            let task = task.trim();
            let stored = session.set_hours(date, category, task, &hours).await?;
            if !session.state().categories.contains(category, task) {
                println!("Note: {task:?} isn't a listed {category} task");
            }
            println!(
                "{}\t{category}\t{task}\t{}",
                date_to_key(date),
                report::format_hours(stored)
            );
            Ok(())
        }
        Commands::Day { date } => {
            let date = date.resolve(session.today())?;
            let state = session.state();
            print!("{}", report::render_day(&state.entries, &state.categories, date)?);
            Ok(())
        }
        Commands::Task { command } => process_task_command(session, command).await,
        Commands::Stats => {
            print!("{}", report::render_statistics(&session.statistics())?);
            Ok(())
        }
        Commands::Allocation => {
            print!(
                "{}",
                report::render_allocation(&session.allocation(), &session.state().settings)?
            );
            Ok(())
        }
        Commands::Missing => {
            if !session.state().settings.missing_data.enabled {
                println!("Missing day detection is disabled");
                return Ok(());
            }
            print!("{}", report::render_missing(&session.missing_days())?);
            Ok(())
        }
        Commands::Export { kind, output } => {
            let writer: Box<dyn io::Write> = match &output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout()),
            };
            match kind {
                ExportKind::Detailed => write_csv(
                    writer,
                    &DETAILED_HEADER,
                    &detailed_rows(&session.state().entries),
                )?,
                ExportKind::Weekly => {
                    write_csv(writer, &WEEKLY_HEADER, &weekly_rows(&session.statistics()))?
                }
            }
            if let Some(path) = output {
                info!("Exported {kind:?} to {path:?}");
            }
            Ok(())
        }
        Commands::Import { path } => {
            session.import_file(&path).await?;
            println!("Imported {path:?}");
            Ok(())
        }
        Commands::Settings { command } => process_settings_command(session, command).await,
    }
}

async fn process_task_command<S: StateStore>(
    session: &mut Session<S>,
    command: TaskCommand,
) -> Result<()> {
    match command {
        TaskCommand::List => {}
        TaskCommand::Add { category, name } => session.add_task(category, &name).await?,
        TaskCommand::Remove { category, name } => {
            if !session.remove_task(category, &name).await? {
                println!("{category} has no task {name:?}");
            }
        }
        TaskCommand::Reset => session.reset_taxonomy().await?,
    }
    print!("{}", report::render_taxonomy(&session.state().categories)?);
    Ok(())
}
