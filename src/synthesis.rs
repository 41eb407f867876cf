//! Goal records created on behalf of the owner when a book is finished.

use anyhow::Result;
use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::id::generate_id;
use crate::interval::{end_of_day, interval_start};
use crate::models::GoalRecord;

/// Build and store the goal record for a book finished at `finished_at`.
///
/// The book must already be saved as finished so that it counts toward
/// `achieved`. The window runs from the start of the owner's current goal
/// interval to the end of the finishing day, in UTC.
pub fn record_finished_book(
    owner: &str,
    finished_at: Timestamp,
    db: &mut Database,
) -> Result<GoalRecord> {
    let settings = db.settings(owner);
    let interval = settings.goal_interval.as_ref();
    if settings.reading_goal == 0 {
        warn!(owner, "no reading goal set; recording with a target of 0");
    }

    let start = interval_start(finished_at, interval)?;
    let window_end = end_of_day(finished_at)?;
    let achieved = db.count_finished_between(owner, start, window_end);
    debug!(owner, interval, %start, %window_end, achieved, "counted finished books");

    let record = GoalRecord::new(
        generate_id(),
        owner.to_owned(),
        interval.to_owned(),
        settings.reading_goal,
        achieved,
        start,
        finished_at,
        Timestamp::now(),
    );
    db.create_goal_record(record.clone())?;

    info!(
        owner,
        id = %record.id,
        target = record.target,
        achieved = record.achieved,
        was_completed = record.was_completed,
        "recorded goal interval"
    );
    Ok(record)
}
