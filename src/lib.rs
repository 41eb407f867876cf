#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod commands;
pub mod db;
pub mod helpers;
pub mod id;
pub mod interval;
pub mod models;
pub mod output;
pub mod stats;
pub mod synthesis;

use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;
use tracing::debug;

use cli::{BookCommands, Cli, Commands, GoalCommands, SettingsCommands};
use db::Database;
use output::Output;

pub const DATA_DIR: &str = ".shelfwise";
pub const REDIRECT_FILE: &str = "redirect";
pub const DATA_DIR_ENV: &str = "SHELFWISE_DIR";

/// Finds the `.shelfwise/` directory by walking up from the current directory.
/// Returns `None` if no `.shelfwise/` directory is found.
pub fn find_data_dir() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    let mut dir = current_dir.as_path();

    loop {
        let data_path = dir.join(DATA_DIR);
        if data_path.is_dir() {
            return Some(data_path);
        }

        dir = dir.parent()?;
    }
}

/// Resolves the final data directory. `SHELFWISE_DIR` wins outright;
/// otherwise the discovered directory is used, following any redirect file.
/// A redirect file contains a path (absolute or relative) to another `.shelfwise/` directory.
pub fn resolve_data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }

    let data_dir = find_data_dir()?;
    let redirect_path = data_dir.join(REDIRECT_FILE);

    if redirect_path.is_file() {
        let target = std::fs::read_to_string(&redirect_path).ok()?;
        let target = target.trim();

        let target_path = if PathBuf::from(target).is_absolute() {
            PathBuf::from(target)
        } else {
            data_dir.parent()?.join(target)
        };

        if target_path.is_dir() {
            return Some(target_path);
        }
    }

    Some(data_dir)
}

/// Owner identifiers name a directory, so they must be a single plain path
/// component.
pub fn validate_owner(owner: &str) -> Result<()> {
    if owner.is_empty() {
        bail!("Owner must not be empty");
    }
    if owner.starts_with('.') || owner.contains(['/', '\\']) {
        bail!("Invalid owner: {owner} (must not start with '.' or contain path separators)");
    }
    Ok(())
}

fn ensure_initialized() -> Result<Database> {
    let data_dir = resolve_data_dir()
        .ok_or_else(|| anyhow!("Shelfwise not initialized. Run 'sw init' first."))?;
    debug!(path = %data_dir.display(), "using data directory");

    Database::open(&data_dir).context("Failed to open database")
}

fn run_book(book_cmd: BookCommands, owner: &str, db: &mut Database) -> Result<()> {
    match book_cmd {
        BookCommands::Add {
            title,
            fields,
            json,
        } => {
            let result = commands::book::add(owner, title, fields, db)?;
            Output::new(json).book_added(&result)
        }
        BookCommands::List { deleted, json } => {
            if deleted {
                let books = commands::book::list_deleted(owner, db);
                Output::new(json).deleted_book_list(&books)
            } else {
                let books = commands::book::list(owner, db);
                Output::new(json).book_list(&books)
            }
        }
        BookCommands::Search { query, json } => {
            let books = commands::book::search(owner, &query, db);
            Output::new(json).search_results(&query, &books)
        }
        BookCommands::Update {
            book_id,
            title,
            fields,
            json,
        } => {
            let result = commands::book::update(owner, &book_id, title, fields, db)?;
            Output::new(json).book_updated(&result)
        }
        BookCommands::Finish { book_id, at, json } => {
            let result = commands::book::finish(owner, &book_id, at, db)?;
            Output::new(json).book_finished(&result)
        }
        BookCommands::Delete { book_id } => {
            let book = commands::book::delete(owner, &book_id, db)?;
            Output::new(false).book_deleted(&book)
        }
        BookCommands::Restore { book_id } => {
            let book = commands::book::restore(owner, &book_id, db)?;
            Output::new(false).book_restored(&book)
        }
        BookCommands::Purge { days, json } => {
            let books = commands::book::purge(owner, days, db)?;
            Output::new(json).books_purged(&books)
        }
    }
}

fn run_goal(goal_cmd: GoalCommands, owner: &str, db: &mut Database) -> Result<()> {
    match goal_cmd {
        GoalCommands::Set { target } => {
            let target = commands::goal::set_reading_goal(owner, target, db)?;
            Output::new(false).reading_goal_set(target)
        }
        GoalCommands::Show { json } => {
            let settings = commands::settings::show(owner, db);
            Output::new(json).reading_goal(&settings)
        }
        GoalCommands::Record {
            interval,
            target,
            achieved,
            start,
            end,
            json,
        } => {
            let record = commands::goal::record(owner, interval, target, achieved, start, end, db)?;
            Output::new(json).goal_recorded(&record)
        }
        GoalCommands::History { json } => {
            let records = commands::goal::history(owner, db);
            Output::new(json).goal_history(&records)
        }
        GoalCommands::Stats { json } => {
            let stats = commands::goal::stats(owner, db);
            Output::new(json).goal_stats(&stats)
        }
    }
}

fn run_settings(settings_cmd: SettingsCommands, owner: &str, db: &mut Database) -> Result<()> {
    match settings_cmd {
        SettingsCommands::Show { json } => {
            let settings = commands::settings::show(owner, db);
            Output::new(json).settings(&settings)
        }
        SettingsCommands::Set {
            interval,
            excluded_days,
            json,
        } => {
            let settings = commands::settings::set(owner, interval, excluded_days, db)?;
            Output::new(json).settings_updated(&settings)
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let owner = cli.owner;

    match cli.command {
        Commands::Init { stealth } => {
            let result = commands::init::run(stealth)?;
            Output::new(false).initialized(&result)
        }
        Commands::Book(book_cmd) => {
            validate_owner(&owner)?;
            let mut db = ensure_initialized()?;
            run_book(book_cmd, &owner, &mut db)
        }
        Commands::Goal(goal_cmd) => {
            validate_owner(&owner)?;
            let mut db = ensure_initialized()?;
            run_goal(goal_cmd, &owner, &mut db)
        }
        Commands::Settings(settings_cmd) => {
            validate_owner(&owner)?;
            let mut db = ensure_initialized()?;
            run_settings(settings_cmd, &owner, &mut db)
        }
        Commands::Prep => {
            let text = commands::prep::run();
            Output::new(false).prep(text)
        }
    }
}
