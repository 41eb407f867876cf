use anyhow::Result;
use jiff::Timestamp;
use tracing::info;

use crate::db::Database;
use crate::interval::GoalInterval;
use crate::models::StreakSettings;

pub fn show(owner: &str, db: &Database) -> StreakSettings {
    db.settings(owner)
}

/// Apply the given changes and persist. With no changes the settings are
/// still written, so defaults become explicit on disk.
pub fn set(
    owner: &str,
    interval: Option<GoalInterval>,
    excluded_days: Option<Vec<u8>>,
    db: &mut Database,
) -> Result<StreakSettings> {
    let mut settings = db.settings(owner);

    if let Some(interval) = interval {
        settings.goal_interval = interval;
    }
    if let Some(days) = excluded_days {
        settings.set_excluded_days(days)?;
    }
    settings.updated_at = Timestamp::now();

    db.save_settings(settings.clone())?;
    info!(
        owner,
        interval = %settings.goal_interval,
        excluded_days = ?settings.excluded_days,
        "updated streak settings"
    );
    Ok(settings)
}
