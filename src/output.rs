use anyhow::Result;
use console::{Term, style};
use serde::Serialize;

use crate::commands::book::{AddResult, UpdateResult};
use crate::commands::init::InitResult;
use crate::models::{Book, GoalRecord, StreakSettings};
use crate::stats::GoalStats;

pub struct Output {
    term: Term,
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            json,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.term.write_line(&output)?;
        Ok(())
    }

    pub fn initialized(&self, result: &InitResult) -> Result<()> {
        match result {
            InitResult::AlreadyInitialized(path) => {
                self.term.write_line(&format!(
                    "Shelfwise already initialized in {}",
                    path.display()
                ))?;
            }
            InitResult::Created { path, excluded_in } => {
                if let Some(file) = excluded_in {
                    self.term
                        .write_line(&format!("Added .shelfwise to {file}"))?;
                }
                self.term
                    .write_line(&format!("Initialized shelfwise in {}", path.display()))?;
            }
        }
        Ok(())
    }

    // Books

    fn print_book_summary(&self, book: &Book) -> Result<()> {
        let status = if book.finished_at.is_some() {
            style("finished").green()
        } else if book.started_at.is_some() {
            style("reading").yellow()
        } else {
            style("unread").dim()
        };

        self.term.write_line(&format!(
            "{} [{}]",
            style(&book.id).cyan().bold(),
            status
        ))?;
        self.term
            .write_line(&format!("  {} by {}", book.title, book.author))?;
        if !book.genre.is_empty() {
            self.term.write_line(&format!("  Genre: {}", book.genre))?;
        }
        if book.rating > 0.0 {
            self.term.write_line(&format!("  Rating: {}", book.rating))?;
        }
        if book.page_count > 0 {
            self.term
                .write_line(&format!("  Pages: {}", book.page_count))?;
        }
        if let Some(finished_at) = &book.finished_at {
            self.term
                .write_line(&format!("  Finished: {finished_at}"))?;
        }
        Ok(())
    }

    fn print_record_line(&self, record: &GoalRecord) -> Result<()> {
        let outcome = if record.was_completed {
            style("met").green()
        } else {
            style("missed").red()
        };
        self.term.write_line(&format!(
            "{} [{}] {} {}/{} ending {}",
            style(&record.id).cyan(),
            outcome,
            record.interval,
            record.achieved,
            record.target,
            record.end_date
        ))?;
        Ok(())
    }

    fn print_synthesized(&self, record: Option<&GoalRecord>) -> Result<()> {
        if let Some(record) = record {
            self.term.write_line("")?;
            self.term
                .write_line(&style("Goal interval recorded:").yellow().to_string())?;
            self.term.write_line(&format!(
                "  {} {}/{} since {} ({})",
                record.interval,
                record.achieved,
                record.target,
                record.start_date,
                if record.was_completed {
                    "met"
                } else {
                    "not met yet"
                }
            ))?;
        }
        Ok(())
    }

    pub fn book_added(&self, result: &AddResult) -> Result<()> {
        match result {
            AddResult::Added { book, record } => {
                if self.json {
                    #[derive(Serialize)]
                    struct Added<'a> {
                        book: &'a Book,
                        goal_record: Option<&'a GoalRecord>,
                    }
                    return self.print_json(&Added {
                        book,
                        goal_record: record.as_ref(),
                    });
                }

                self.term.write_line(&format!(
                    "{} {}",
                    style("Added book:").green(),
                    style(&book.id).cyan().bold()
                ))?;
                self.term
                    .write_line(&format!("  {} by {}", book.title, book.author))?;
                self.print_synthesized(record.as_ref())
            }
            AddResult::Restored(book) => {
                if self.json {
                    return self.print_json(book);
                }
                self.book_restored(book)
            }
        }
    }

    pub fn book_list(&self, books: &[Book]) -> Result<()> {
        if self.json {
            return self.print_json(books);
        }

        if books.is_empty() {
            self.term.write_line("No books found.")?;
            return Ok(());
        }

        for book in books {
            self.print_book_summary(book)?;
            self.term.write_line("")?;
        }
        Ok(())
    }

    pub fn deleted_book_list(&self, books: &[Book]) -> Result<()> {
        if self.json {
            return self.print_json(books);
        }

        if books.is_empty() {
            self.term.write_line("No deleted books.")?;
            return Ok(());
        }

        for book in books {
            self.term.write_line(&format!(
                "{} {} by {}",
                style(&book.id).cyan().bold(),
                book.title,
                book.author
            ))?;
            if let Some(deleted_at) = &book.deleted_at {
                self.term.write_line(&format!(
                    "  Deleted: {}",
                    style(deleted_at).dim()
                ))?;
            }
        }
        Ok(())
    }

    pub fn search_results(&self, query: &str, books: &[Book]) -> Result<()> {
        if self.json {
            return self.print_json(books);
        }

        if books.is_empty() {
            self.term
                .write_line(&format!("No books matching \"{query}\"."))?;
            return Ok(());
        }

        self.term.write_line(&format!(
            "{} book(s) matching \"{query}\":",
            style(books.len()).green().bold()
        ))?;
        self.term.write_line("")?;
        self.book_list(books)
    }

    pub fn book_updated(&self, result: &UpdateResult) -> Result<()> {
        if self.json {
            return self.print_update_json(result);
        }

        self.term.write_line(&format!(
            "{} {}",
            style("Updated book:").green(),
            style(&result.book.id).cyan().bold()
        ))?;
        self.print_book_summary(&result.book)?;
        self.print_synthesized(result.record.as_ref())
    }

    pub fn book_finished(&self, result: &UpdateResult) -> Result<()> {
        if self.json {
            return self.print_update_json(result);
        }

        self.term.write_line(&format!(
            "{} {}",
            style("Finished book:").green(),
            style(&result.book.id).cyan().bold()
        ))?;
        self.term.write_line(&format!(
            "  {} by {}",
            result.book.title, result.book.author
        ))?;
        self.print_synthesized(result.record.as_ref())
    }

    fn print_update_json(&self, result: &UpdateResult) -> Result<()> {
        #[derive(Serialize)]
        struct Updated<'a> {
            book: &'a Book,
            goal_record: Option<&'a GoalRecord>,
        }
        self.print_json(&Updated {
            book: &result.book,
            goal_record: result.record.as_ref(),
        })
    }

    pub fn book_deleted(&self, book: &Book) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Deleted book:").red(),
            style(&book.id).cyan().bold()
        ))?;
        self.term
            .write_line(&format!("  Restore with: sw book restore {}", book.id))?;
        Ok(())
    }

    pub fn book_restored(&self, book: &Book) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Restored book:").green(),
            style(&book.id).cyan().bold()
        ))?;
        self.term
            .write_line(&format!("  {} by {}", book.title, book.author))?;
        Ok(())
    }

    pub fn books_purged(&self, books: &[Book]) -> Result<()> {
        if self.json {
            return self.print_json(books);
        }

        if books.is_empty() {
            self.term.write_line("No deleted books to purge.")?;
            return Ok(());
        }

        self.term.write_line(&format!(
            "{} {} book(s)",
            style("Purged").red(),
            style(books.len()).bold()
        ))?;
        for book in books {
            self.term.write_line(&format!(
                "  {} {} by {}",
                style(&book.id).cyan(),
                book.title,
                book.author
            ))?;
        }
        Ok(())
    }

    // Goals

    pub fn reading_goal_set(&self, target: i64) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Reading goal set:").green(),
            style(target).bold()
        ))?;
        Ok(())
    }

    pub fn reading_goal(&self, settings: &StreakSettings) -> Result<()> {
        if self.json {
            #[derive(Serialize)]
            struct ReadingGoal<'a> {
                reading_goal: i64,
                goal_interval: &'a str,
            }
            return self.print_json(&ReadingGoal {
                reading_goal: settings.reading_goal,
                goal_interval: settings.goal_interval.as_ref(),
            });
        }

        self.term.write_line(&format!(
            "Reading goal: {} book(s) {}",
            style(settings.reading_goal).bold(),
            style(settings.goal_interval.as_ref()).yellow()
        ))?;
        Ok(())
    }

    pub fn goal_recorded(&self, record: &GoalRecord) -> Result<()> {
        if self.json {
            return self.print_json(record);
        }

        self.term.write_line(&format!(
            "{} {}",
            style("Recorded goal interval:").green(),
            style(&record.id).cyan().bold()
        ))?;
        self.print_record_line(record)
    }

    pub fn goal_history(&self, records: &[GoalRecord]) -> Result<()> {
        if self.json {
            return self.print_json(records);
        }

        if records.is_empty() {
            self.term.write_line("No goal history yet.")?;
            return Ok(());
        }

        for record in records {
            self.print_record_line(record)?;
        }
        Ok(())
    }

    pub fn goal_stats(&self, stats: &GoalStats) -> Result<()> {
        if self.json {
            return self.print_json(stats);
        }

        self.term
            .write_line(&style("Goal streaks:").bold().to_string())?;
        self.term.write_line(&format!(
            "  Current streak: {}",
            style(stats.current_goal_streak).green().bold()
        ))?;
        self.term.write_line(&format!(
            "  Longest streak: {}",
            stats.longest_goal_streak
        ))?;
        self.term.write_line(&format!(
            "  Goals met: {}/{} ({:.2}%)",
            stats.total_goals_met, stats.total_goals_set, stats.goal_completion_rate
        ))?;
        self.term.write_line(&format!(
            "  Average overshoot: {:.2}%",
            stats.average_overshoot
        ))?;
        let best = if stats.best_interval.is_empty() {
            style("-".to_string()).dim()
        } else {
            style(stats.best_interval.clone()).yellow()
        };
        self.term
            .write_line(&format!("  Best interval: {best}"))?;
        match &stats.last_goal_met {
            Some(at) => self
                .term
                .write_line(&format!("  Last goal met: {at}"))?,
            None => self.term.write_line(&format!(
                "  Last goal met: {}",
                style("-").dim()
            ))?,
        }
        Ok(())
    }

    // Settings

    pub fn settings(&self, settings: &StreakSettings) -> Result<()> {
        if self.json {
            return self.print_json(settings);
        }

        self.term
            .write_line(&style("Streak settings:").bold().to_string())?;
        self.term.write_line(&format!(
            "  Goal interval: {}",
            style(settings.goal_interval.as_ref()).yellow()
        ))?;
        self.term
            .write_line(&format!("  Reading goal: {}", settings.reading_goal))?;
        let days = if settings.excluded_days.is_empty() {
            "none".to_string()
        } else {
            settings
                .excluded_days
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.term
            .write_line(&format!("  Excluded days: {days}"))?;
        Ok(())
    }

    pub fn settings_updated(&self, settings: &StreakSettings) -> Result<()> {
        if self.json {
            return self.print_json(settings);
        }

        self.term
            .write_line(&style("Updated streak settings.").green().to_string())?;
        self.settings(settings)
    }

    pub fn prep(&self, text: &str) -> Result<()> {
        self.term.write_line(text)?;
        Ok(())
    }
}
