use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::db::atomic_write;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl Book {
    pub fn new(id: String, owner: String, title: String, author: String, now: Timestamp) -> Self {
        Self {
            id,
            owner,
            title,
            author,
            cover_image: String::new(),
            rating: 0.0,
            page_count: 0,
            genre: String::new(),
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the book was finished inside `[from, to]`, both ends inclusive.
    pub fn finished_between(&self, from: Timestamp, to: Timestamp) -> bool {
        self.finished_at.is_some_and(|at| at >= from && at <= to)
    }

    /// Case-insensitive substring match over title, author and genre.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.author, &self.genre]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn file_path(&self, base: &Path) -> PathBuf {
        base.join(&self.owner)
            .join("books")
            .join(format!("{}.toml", self.id))
    }

    pub fn write_file(&self, base: &Path) -> Result<()> {
        let path = self.file_path(base);
        let content = toml::to_string(self).context("Failed to serialize book")?;
        atomic_write(&path, content.as_bytes())
    }
}
