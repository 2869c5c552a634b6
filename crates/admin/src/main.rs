use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use royalty_admin::{Fixture, run_fixture};
use royalty_core::CompanyId;
use royalty_infra::Settings;

#[derive(Parser)]
#[command(name = "royalty-admin")]
#[command(about = "Run royalty distributions against a fixture")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distribute pending utilisations between two dates (inclusive)
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON fixture to load
    #[arg(long)]
    fixture: PathBuf,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    thru: NaiveDate,

    /// Booking date of the moves; defaults to today (UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Settings file; ROYALTY_* variables override it
    #[arg(short, long, env = "ROYALTY_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Settings::for_company(CompanyId::new()),
    };
    let settings = settings.apply_env()?;
    royalty_observability::init_with(settings.log_format);

    if args.config.is_none() {
        tracing::warn!("no settings file given; using defaults for a fresh company");
    }

    let fixture = Fixture::from_file(&args.fixture)?;
    let run_date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let report = run_fixture(&settings, &fixture, run_date, args.from, args.thru)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
