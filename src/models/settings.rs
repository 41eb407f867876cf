use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::db::atomic_write;
use crate::interval::GoalInterval;

/// Per-owner reading goal and streak preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakSettings {
    pub owner: String,
    #[serde(default)]
    pub reading_goal: i64,
    #[serde(default)]
    pub goal_interval: GoalInterval,
    /// Weekday numbers, Sunday = 0.
    #[serde(default)]
    pub excluded_days: Vec<u8>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StreakSettings {
    pub fn new(owner: String, now: Timestamp) -> Self {
        Self {
            owner,
            reading_goal: 0,
            goal_interval: GoalInterval::default(),
            excluded_days: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the excluded weekdays, rejecting anything outside 0..=6.
    /// Duplicates are dropped and the result is kept sorted.
    pub fn set_excluded_days(&mut self, mut days: Vec<u8>) -> Result<()> {
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            bail!("Invalid excluded day: {bad} (expected 0-6, Sunday = 0)");
        }
        days.sort_unstable();
        days.dedup();
        self.excluded_days = days;
        Ok(())
    }

    pub fn file_path(&self, base: &Path) -> PathBuf {
        base.join(&self.owner).join("settings.toml")
    }

    pub fn write_file(&self, base: &Path) -> Result<()> {
        let path = self.file_path(base);
        let content = toml::to_string(self).context("Failed to serialize settings")?;
        atomic_write(&path, content.as_bytes())
    }
}
