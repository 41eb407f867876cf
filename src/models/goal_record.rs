use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::db::atomic_write;

/// Outcome of one goal period. Records are written once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalRecord {
    pub id: String,
    pub owner: String,
    /// Open label; only `daily`, `weekly`, `monthly` and `yearly` carry meaning.
    pub interval: String,
    pub target: i64,
    pub achieved: i64,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub was_completed: bool,
    pub created_at: Timestamp,
}

impl GoalRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        owner: String,
        interval: String,
        target: i64,
        achieved: i64,
        start_date: Timestamp,
        end_date: Timestamp,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            interval,
            target,
            achieved,
            start_date,
            end_date,
            was_completed: achieved >= target,
            created_at,
        }
    }

    pub fn file_path(&self, base: &Path) -> PathBuf {
        base.join(&self.owner)
            .join("history")
            .join(format!("{}.toml", self.id))
    }

    pub fn write_file(&self, base: &Path) -> Result<()> {
        let path = self.file_path(base);
        let content = toml::to_string(self).context("Failed to serialize goal record")?;
        atomic_write(&path, content.as_bytes())
    }
}
