use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use jiff::Timestamp;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Book, GoalRecord, StreakSettings};

const SETTINGS_FILE: &str = "settings.toml";
const BOOKS_DIR: &str = "books";
const HISTORY_DIR: &str = "history";

/// Atomically write content to a file using a temporary file + rename.
/// Missing parent directories are created.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp = path.with_extension("toml.tmp");
    let mut file = File::create(&temp)
        .with_context(|| format!("Failed to create temporary file: {}", temp.display()))?;
    file.lock_exclusive()
        .context("Failed to acquire file lock")?;
    file.write_all(content)
        .context("Failed to write file content")?;
    file.sync_all().context("Failed to sync file")?;
    file.unlock().context("Failed to unlock file")?;
    fs::rename(&temp, path).with_context(|| format!("Failed to rename to {}", path.display()))?;
    Ok(())
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Every `*.toml` file directly inside `dir`. A missing directory is empty.
fn toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.extension() == Some(OsStr::new("toml")) {
            files.push(path);
        }
    }
    Ok(files)
}

/// In-memory view of the `.shelfwise/` directory.
///
/// Layout, one directory per owner:
/// `<owner>/settings.toml`, `<owner>/books/<id>.toml`, `<owner>/history/<id>.toml`.
pub struct Database {
    path: PathBuf,
    books: HashMap<String, Book>,
    records: HashMap<String, GoalRecord>,
    settings: HashMap<String, StreakSettings>,
}

impl Database {
    /// Open an existing database from the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            bail!("Database directory does not exist: {}", path.display());
        }

        let mut db = Self {
            path,
            books: HashMap::new(),
            records: HashMap::new(),
            settings: HashMap::new(),
        };

        db.load()?;
        Ok(db)
    }

    /// The base path for the `.shelfwise/` directory.
    pub fn base_path(&self) -> &Path {
        &self.path
    }

    /// Load all data from the per-entity TOML files into memory.
    fn load(&mut self) -> Result<()> {
        let dir = fs::read_dir(&self.path).context("Failed to read .shelfwise directory")?;

        for entry in dir {
            let entry = entry.context("Failed to read directory entry")?;
            let owner_dir = entry.path();

            if !owner_dir.is_dir() {
                continue;
            }

            let settings_path = owner_dir.join(SETTINGS_FILE);
            if settings_path.exists() {
                let settings: StreakSettings = read_toml(&settings_path)?;
                self.settings.insert(settings.owner.clone(), settings);
            }

            for path in toml_files(&owner_dir.join(BOOKS_DIR))? {
                let book: Book = read_toml(&path)?;
                self.books.insert(book.id.clone(), book);
            }

            for path in toml_files(&owner_dir.join(HISTORY_DIR))? {
                let record: GoalRecord = read_toml(&path)?;
                self.records.insert(record.id.clone(), record);
            }
        }

        debug!(
            path = %self.path.display(),
            books = self.books.len(),
            records = self.records.len(),
            owners = self.settings.len(),
            "loaded database"
        );
        Ok(())
    }

    // Book operations

    pub fn create_book(&mut self, book: Book) -> Result<()> {
        if self.books.contains_key(&book.id) {
            bail!("Book already exists: {}", book.id);
        }

        book.write_file(&self.path)?;
        debug!(id = %book.id, owner = %book.owner, "wrote book");
        self.books.insert(book.id.clone(), book);

        Ok(())
    }

    pub fn update_book(&mut self, book: Book) -> Result<()> {
        if !self.books.contains_key(&book.id) {
            bail!("Book not found: {}", book.id);
        }

        book.write_file(&self.path)?;
        debug!(id = %book.id, owner = %book.owner, "rewrote book");
        self.books.insert(book.id.clone(), book);

        Ok(())
    }

    /// Look up a book by ID within one owner's collection, deleted or not.
    pub fn get_book(&self, owner: &str, id: &str) -> Option<&Book> {
        self.books.get(id).filter(|b| b.owner == owner)
    }

    /// The owner's books that are not soft-deleted, oldest first.
    pub fn list_books(&self, owner: &str) -> Vec<&Book> {
        let mut books: Vec<&Book> = self
            .books
            .values()
            .filter(|b| b.owner == owner && !b.is_deleted())
            .collect();
        books.sort_by_key(|b| b.created_at);
        books
    }

    /// The owner's soft-deleted books, most recently deleted first.
    pub fn list_deleted_books(&self, owner: &str) -> Vec<&Book> {
        let mut books: Vec<&Book> = self
            .books
            .values()
            .filter(|b| b.owner == owner && b.is_deleted())
            .collect();
        books.sort_by_key(|b| std::cmp::Reverse(b.deleted_at));
        books
    }

    /// Exact title match, including soft-deleted books.
    /// A live book wins over deleted ones; otherwise the oldest match wins.
    pub fn find_book_by_title(&self, owner: &str, title: &str) -> Option<&Book> {
        self.books
            .values()
            .filter(|b| b.owner == owner && b.title == title)
            .min_by_key(|b| (b.is_deleted(), b.created_at, b.id.as_str()))
    }

    /// Permanently remove the owner's books soft-deleted before `cutoff`.
    /// Returns the removed books, oldest deletion first.
    pub fn purge_deleted_books(&mut self, owner: &str, cutoff: Timestamp) -> Result<Vec<Book>> {
        let mut expired: Vec<String> = self
            .books
            .values()
            .filter(|b| b.owner == owner && b.deleted_at.is_some_and(|at| at < cutoff))
            .map(|b| b.id.clone())
            .collect();
        expired.sort();

        let mut purged = Vec::with_capacity(expired.len());
        for id in expired {
            let Some(book) = self.books.remove(&id) else {
                continue;
            };
            let path = book.file_path(&self.path);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
            debug!(id = %book.id, owner = %book.owner, "purged book");
            purged.push(book);
        }
        purged.sort_by_key(|b| b.deleted_at);
        Ok(purged)
    }

    /// IDs of every book the owner has, for "did you mean" suggestions.
    pub fn book_ids(&self, owner: &str) -> Vec<&str> {
        self.books
            .values()
            .filter(|b| b.owner == owner)
            .map(|b| b.id.as_str())
            .collect()
    }

    /// Number of the owner's non-deleted books finished within `[from, to]`.
    pub fn count_finished_between(&self, owner: &str, from: Timestamp, to: Timestamp) -> i64 {
        let count = self
            .list_books(owner)
            .into_iter()
            .filter(|b| b.finished_between(from, to))
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    // Goal record operations

    pub fn create_goal_record(&mut self, record: GoalRecord) -> Result<()> {
        if self.records.contains_key(&record.id) {
            bail!("Goal record already exists: {}", record.id);
        }

        record.write_file(&self.path)?;
        debug!(id = %record.id, owner = %record.owner, "wrote goal record");
        self.records.insert(record.id.clone(), record);

        Ok(())
    }

    /// Every record belonging to `owner`, ordered by `end_date`, then
    /// `created_at`, then ID, so ties come out the same on every load.
    pub fn list_goal_records(&self, owner: &str) -> Vec<&GoalRecord> {
        let mut records: Vec<&GoalRecord> = self
            .records
            .values()
            .filter(|r| r.owner == owner)
            .collect();
        records.sort_by(|a, b| {
            (a.end_date, a.created_at, a.id.as_str()).cmp(&(b.end_date, b.created_at, b.id.as_str()))
        });
        records
    }

    // Settings operations

    /// The owner's settings, or defaults if none have been saved.
    pub fn settings(&self, owner: &str) -> StreakSettings {
        self.settings
            .get(owner)
            .cloned()
            .unwrap_or_else(|| StreakSettings::new(owner.to_owned(), Timestamp::now()))
    }

    pub fn save_settings(&mut self, settings: StreakSettings) -> Result<()> {
        settings.write_file(&self.path)?;
        debug!(owner = %settings.owner, "wrote settings");
        self.settings.insert(settings.owner.clone(), settings);
        Ok(())
    }
}
