use anyhow::{Result, bail};
use jiff::{SignedDuration, Timestamp};
use tracing::info;

use crate::cli::BookFields;
use crate::db::Database;
use crate::helpers::book_not_found;
use crate::id::generate_id;
use crate::models::{Book, GoalRecord};
use crate::synthesis::record_finished_book;

/// Soft-deleted books older than this are eligible for `book purge`.
pub const DEFAULT_PURGE_DAYS: u32 = 30;

/// Result of `book add`: either a new book, or a deleted copy brought back.
#[derive(Debug)]
pub enum AddResult {
    Added {
        book: Book,
        record: Option<GoalRecord>,
    },
    Restored(Book),
}

/// A book change plus the goal record it produced, if the book was just finished.
#[derive(Debug)]
pub struct UpdateResult {
    pub book: Book,
    pub record: Option<GoalRecord>,
}

fn apply_fields(book: &mut Book, fields: BookFields) {
    let BookFields {
        author,
        genre,
        rating,
        page_count,
        cover_image,
        started_at,
        finished_at,
    } = fields;

    if let Some(author) = author {
        book.author = author;
    }
    if let Some(genre) = genre {
        book.genre = genre;
    }
    if let Some(rating) = rating {
        book.rating = rating;
    }
    if let Some(page_count) = page_count {
        book.page_count = page_count;
    }
    if let Some(cover_image) = cover_image {
        book.cover_image = cover_image;
    }
    if started_at.is_some() {
        book.started_at = started_at;
    }
    if finished_at.is_some() {
        book.finished_at = finished_at;
    }
}

fn find_book(owner: &str, book_id: &str, db: &Database) -> Result<Book> {
    db.get_book(owner, book_id)
        .cloned()
        .ok_or_else(|| book_not_found(book_id, &db.book_ids(owner)))
}

pub fn add(owner: &str, title: String, fields: BookFields, db: &mut Database) -> Result<AddResult> {
    if title.trim().is_empty() {
        bail!("Book title must not be empty");
    }

    if let Some(existing) = db.find_book_by_title(owner, &title).cloned() {
        if !existing.is_deleted() {
            bail!("This book already exists in your collection: {}", existing.id);
        }

        let mut restored = existing;
        restored.deleted_at = None;
        restored.updated_at = Timestamp::now();
        db.update_book(restored.clone())?;
        info!(owner, id = %restored.id, "restored book on re-add");
        return Ok(AddResult::Restored(restored));
    }

    let Some(author) = fields.author.clone() else {
        bail!("An author is required when adding a new book (--author)");
    };

    let mut book = Book::new(generate_id(), owner.to_owned(), title, author, Timestamp::now());
    apply_fields(&mut book, fields);
    db.create_book(book.clone())?;
    info!(owner, id = %book.id, title = %book.title, "added book");

    let record = match book.finished_at {
        Some(finished_at) => Some(record_finished_book(owner, finished_at, db)?),
        None => None,
    };

    Ok(AddResult::Added { book, record })
}

pub fn list(owner: &str, db: &Database) -> Vec<Book> {
    db.list_books(owner).into_iter().cloned().collect()
}

pub fn list_deleted(owner: &str, db: &Database) -> Vec<Book> {
    db.list_deleted_books(owner).into_iter().cloned().collect()
}

pub fn search(owner: &str, query: &str, db: &Database) -> Vec<Book> {
    let needle = query.trim().to_lowercase();
    db.list_books(owner)
        .into_iter()
        .filter(|b| b.matches(&needle))
        .cloned()
        .collect()
}

pub fn update(
    owner: &str,
    book_id: &str,
    title: Option<String>,
    fields: BookFields,
    db: &mut Database,
) -> Result<UpdateResult> {
    let existing = find_book(owner, book_id, db)?;
    if existing.is_deleted() {
        bail!("Book is deleted: {book_id}\nRestore it first with: sw book restore {book_id}");
    }

    let mut book = existing.clone();
    if let Some(title) = title {
        if title.trim().is_empty() {
            bail!("Book title must not be empty");
        }
        if let Some(other) = db
            .list_books(owner)
            .into_iter()
            .find(|b| b.title == title && b.id != book.id)
        {
            bail!("This book already exists in your collection: {}", other.id);
        }
        book.title = title;
    }
    apply_fields(&mut book, fields);
    book.updated_at = Timestamp::now();
    db.update_book(book.clone())?;
    info!(owner, id = %book.id, "updated book");

    let record = match (existing.finished_at, book.finished_at) {
        (None, Some(finished_at)) => Some(record_finished_book(owner, finished_at, db)?),
        _ => None,
    };

    Ok(UpdateResult { book, record })
}

pub fn finish(
    owner: &str,
    book_id: &str,
    at: Option<Timestamp>,
    db: &mut Database,
) -> Result<UpdateResult> {
    let fields = BookFields {
        finished_at: Some(at.unwrap_or_else(Timestamp::now)),
        ..BookFields::default()
    };
    update(owner, book_id, None, fields, db)
}

pub fn delete(owner: &str, book_id: &str, db: &mut Database) -> Result<Book> {
    let mut book = find_book(owner, book_id, db)?;
    if book.is_deleted() {
        bail!("Book is already deleted: {book_id}");
    }

    let now = Timestamp::now();
    book.deleted_at = Some(now);
    book.updated_at = now;
    db.update_book(book.clone())?;
    info!(owner, id = %book.id, "deleted book");
    Ok(book)
}

pub fn restore(owner: &str, book_id: &str, db: &mut Database) -> Result<Book> {
    let mut book = find_book(owner, book_id, db)?;
    if !book.is_deleted() {
        bail!("Book is not deleted: {book_id}");
    }

    book.deleted_at = None;
    book.updated_at = Timestamp::now();
    db.update_book(book.clone())?;
    info!(owner, id = %book.id, "restored book");
    Ok(book)
}

/// Permanently remove books that were soft-deleted more than `days` days ago.
pub fn purge(owner: &str, days: u32, db: &mut Database) -> Result<Vec<Book>> {
    let cutoff = Timestamp::now().checked_sub(SignedDuration::from_hours(i64::from(days) * 24))?;
    let purged = db.purge_deleted_books(owner, cutoff)?;
    info!(owner, days, count = purged.len(), "purged deleted books");
    Ok(purged)
}
