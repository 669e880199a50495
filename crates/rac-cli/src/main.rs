use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rac_cli::commands::{events, import, render, session, simulate, trains, util};
use rac_cli::{Cli, Commands, Config};
use rac_core::JourneySession;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(rac_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = rac_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Import(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let summary = import::run(&mut db, args.file.as_deref())?;
            match summary.journey_date {
                Some(date) => writeln!(
                    stdout,
                    "Imported train {} ({} stations) with {} of {} bookings new for {date}",
                    summary.train_no, summary.stations, summary.inserted, summary.passengers
                )?,
                None => writeln!(
                    stdout,
                    "Imported train {} ({} stations)",
                    summary.train_no, summary.stations
                )?,
            }
        }
        Some(Commands::Trains { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            trains::run(&mut stdout, &db, *json)?;
        }
        Some(Commands::Simulate(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let key = config.train_key(&args.train)?;
            let no_shows = args
                .no_show
                .iter()
                .map(|pnr| util::parse_pnr(pnr))
                .collect::<Result<Vec<_>>>()?;
            let session = JourneySession::new(db);
            simulate::run(&mut stdout, &session, &key, &no_shows, args.json)?;
        }
        Some(Commands::Session(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let key = config.train_key(args)?;
            let session = JourneySession::new(db);
            let summary = session
                .initialize(&key)
                .with_context(|| format!("failed to load train {key}"))?;
            render::train_summary(&mut stdout, &summary)?;
            writeln!(stdout, "Type `help` for commands.")?;
            session::run(io::stdin().lock(), &mut stdout, &session)?;
        }
        Some(Commands::Events(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            events::run(&mut stdout, &db, args.train.as_deref(), args.date)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
