use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;

use crate::commands::book::DEFAULT_PURGE_DAYS;
use crate::interval::GoalInterval;

pub const DEFAULT_OWNER: &str = "local";

#[derive(Parser)]
#[command(name = "sw")]
#[command(about = "Track a personal book collection, reading goals and goal streaks", long_about = None)]
pub struct Cli {
    /// Whose collection to operate on
    #[arg(long, global = true, env = "SHELFWISE_OWNER", default_value = DEFAULT_OWNER)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize shelfwise in the current directory
    Init {
        /// Initialize without committing to the repo (adds .shelfwise to .gitignore or .git/info/exclude)
        #[arg(long)]
        stealth: bool,
    },

    /// Manage books in the collection
    #[command(subcommand)]
    Book(BookCommands),

    /// Reading goal, goal history and streak statistics
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Streak settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Print a usage guide for scripted use
    Prep,
}

/// Optional book fields shared by `book add` and `book update`.
#[derive(Args, Debug, Default, Clone)]
pub struct BookFields {
    /// Author name
    #[arg(long)]
    pub author: Option<String>,

    /// Genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Rating
    #[arg(long)]
    pub rating: Option<f64>,

    /// Page count
    #[arg(long = "pages")]
    pub page_count: Option<u32>,

    /// Cover image URL
    #[arg(long = "cover")]
    pub cover_image: Option<String>,

    /// When reading started (RFC 3339, e.g. 2024-05-01T12:00:00Z)
    #[arg(long)]
    pub started_at: Option<Timestamp>,

    /// When reading finished (RFC 3339)
    #[arg(long)]
    pub finished_at: Option<Timestamp>,
}

#[derive(Subcommand)]
pub enum BookCommands {
    /// Add a book, or restore it if it was deleted
    Add {
        /// Book title
        title: String,

        #[command(flatten)]
        fields: BookFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List books in the collection
    List {
        /// List soft-deleted books instead
        #[arg(long)]
        deleted: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the collection by title, author or genre
    Search {
        /// Case-insensitive text to look for
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of a book
    Update {
        /// The book ID
        book_id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: BookFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a book as finished
    Finish {
        /// The book ID
        book_id: String,

        /// Finish time (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<Timestamp>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a book from the collection (it can be restored)
    Delete {
        /// The book ID
        book_id: String,
    },

    /// Restore a deleted book
    Restore {
        /// The book ID
        book_id: String,
    },

    /// Permanently remove books deleted more than --days ago
    Purge {
        /// Minimum age of a deletion, in days
        #[arg(long, default_value_t = DEFAULT_PURGE_DAYS)]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Set the reading goal (books per interval)
    Set {
        /// Target number of books
        target: i64,
    },

    /// Show the reading goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the outcome of a goal interval
    Record {
        /// Interval the goal covered
        #[arg(long)]
        interval: GoalInterval,

        /// Goal for the interval
        #[arg(long)]
        target: i64,

        /// Books actually finished
        #[arg(long)]
        achieved: i64,

        /// Start of the interval (RFC 3339)
        #[arg(long)]
        start: Timestamp,

        /// End of the interval (RFC 3339)
        #[arg(long)]
        end: Timestamp,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded goal intervals, oldest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show goal streak statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show streak settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change streak settings
    Set {
        /// Goal interval used for books finished from now on
        #[arg(long)]
        interval: Option<GoalInterval>,

        /// Weekdays excluded from streaks (comma-separated, Sunday = 0)
        #[arg(long, value_delimiter = ',')]
        excluded_days: Option<Vec<u8>>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
