use anyhow::{Result, bail};
use jiff::Timestamp;
use tracing::info;

use crate::db::Database;
use crate::id::generate_id;
use crate::interval::GoalInterval;
use crate::models::GoalRecord;
use crate::stats::{GoalStats, compute_goal_stats};

pub fn set_reading_goal(owner: &str, target: i64, db: &mut Database) -> Result<i64> {
    if target < 0 {
        bail!("Reading goal must not be negative: {target}");
    }

    let mut settings = db.settings(owner);
    settings.reading_goal = target;
    settings.updated_at = Timestamp::now();
    db.save_settings(settings)?;
    info!(owner, reading_goal = target, "updated reading goal");
    Ok(target)
}

pub fn reading_goal(owner: &str, db: &Database) -> i64 {
    db.settings(owner).reading_goal
}

/// Store an explicitly reported goal interval.
#[allow(clippy::too_many_arguments)]
pub fn record(
    owner: &str,
    interval: GoalInterval,
    target: i64,
    achieved: i64,
    start: Timestamp,
    end: Timestamp,
    db: &mut Database,
) -> Result<GoalRecord> {
    if end < start {
        bail!("Interval end ({end}) is before its start ({start})");
    }

    let record = GoalRecord::new(
        generate_id(),
        owner.to_owned(),
        interval.as_ref().to_owned(),
        target,
        achieved,
        start,
        end,
        Timestamp::now(),
    );
    db.create_goal_record(record.clone())?;
    info!(owner, id = %record.id, was_completed = record.was_completed, "recorded goal interval");
    Ok(record)
}

/// The owner's goal records ordered by `end_date`, oldest first.
pub fn history(owner: &str, db: &Database) -> Vec<GoalRecord> {
    db.list_goal_records(owner).into_iter().cloned().collect()
}

pub fn stats(owner: &str, db: &Database) -> GoalStats {
    let records: Vec<GoalRecord> = db.list_goal_records(owner).into_iter().cloned().collect();
    compute_goal_stats(&records)
}
