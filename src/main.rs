mod app;
mod cli;

use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use flashcard_scheduler::config::{self, Config};
use flashcard_scheduler::export::{export_collection, import_batch};
use flashcard_scheduler::{ManualClock, Scheduler};
use log::info;
use std::fs;
use std::io;
use std::sync::Arc;

use cli::{Cli, Commands};

const USER_ENV: &str = "FLASHCARDS_USER";

fn setup_logging(config: &Config) -> Result<()> {
    let log_dir = config::data_dir().join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("flashcards.log");
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn resolve_user(cli: &Cli) -> Result<String> {
    match &cli.user {
        Some(user) => Ok(user.clone()),
        None => std::env::var(USER_ENV)
            .with_context(|| format!("No user given: pass --user or set {}", USER_ENV)),
    }
}

fn build_scheduler(cli: &Cli, config: &Config) -> Result<Scheduler> {
    let scheduler = Scheduler::from_config(config)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match &cli.at {
        Some(at) => {
            let now: DateTime<Utc> = DateTime::parse_from_rfc3339(at)
                .with_context(|| format!("Invalid --at instant: {}", at))?
                .with_timezone(&Utc);
            info!("Pinning clock to {}", now);
            Ok(scheduler.with_clock(Arc::new(ManualClock::new(now))))
        }
        None => Ok(scheduler),
    }
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting flashcards: {:?}", cli.command);

    if cli.is_verbose() {
        println!("{} {}", "Database:".yellow(), config.database_path.display());
    }

    let user = resolve_user(cli)?;
    let scheduler = build_scheduler(cli, config)?;
    let mut stdout = io::stdout();

    match &cli.command {
        Commands::Register {
            collection,
            name,
            text,
        } => {
            if scheduler.register_card(&user, collection, name, text)? {
                println!("{} {}", "Registered:".green(), name);
            } else {
                println!("{} {} already exists", "Skipped:".yellow(), name);
            }
        }
        Commands::Import { file, collection } => {
            let (collection, added) = import_batch(&scheduler, &user, file, collection.as_deref())
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("{} {} new card(s) into {}", "Imported".green(), added, collection);
        }
        Commands::Export { collection, file } => {
            let count = export_collection(scheduler.ledger(), &user, collection, file)
                .with_context(|| format!("Failed to export to {}", file.display()))?;
            println!("{} {} card(s) to {}", "Exported".green(), count, file.display());
        }
        Commands::Due { collection } => {
            let due = scheduler.list_due(&user, collection)?;
            if due.is_empty() {
                println!("{}", "No cards due".yellow());
            }
            for card in due {
                println!("{} (reps {})", card.card_name.bold(), card.reps);
                println!("    {}", card.card_text);
            }
        }
        Commands::Review {
            collection,
            name,
            grade,
        } => {
            let current = scheduler.current_snapshot(&user, collection, name)?;
            let updated =
                scheduler.submit_review(&user, collection, name, &current.card_text, *grade)?;
            app::print_snapshot(&mut stdout, &updated)?;
        }
        Commands::Study { collection } => {
            let stdin = io::stdin();
            let reviewed = app::run_study(&scheduler, &user, collection, &mut stdin.lock(), &mut stdout)?;
            info!("Study session for {}/{} reviewed {} card(s)", user, collection, reviewed);
        }
        Commands::Collections => {
            for collection in scheduler.list_collections(&user)? {
                println!("{}", collection);
            }
        }
        Commands::Cards { collection } => {
            for card in scheduler.list_cards(&user, collection)? {
                app::print_snapshot(&mut stdout, &card)?;
            }
        }
        Commands::History { collection, name } => {
            let events = scheduler.history(&user, collection, name)?;
            if events.is_empty() {
                eyre::bail!("Card not found: {}/{}/{}", user, collection, name);
            }
            for event in &events {
                app::print_event(&mut stdout, event)?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
