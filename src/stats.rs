//! Goal streak statistics.
//!
//! [`compute_goal_stats`] folds an owner's goal records, oldest `end_date`
//! first, into a [`GoalStats`] summary. It performs no I/O and keeps no state
//! between calls.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::interval::max_gap_for;
use crate::models::GoalRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalStats {
    pub current_goal_streak: u32,
    pub longest_goal_streak: u32,
    pub total_goals_set: u32,
    pub total_goals_met: u32,
    pub goal_completion_rate: f64,
    pub average_overshoot: f64,
    pub best_interval: String,
    pub last_goal_met: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, Default)]
struct IntervalTally {
    met: u32,
    total: u32,
}

impl IntervalTally {
    fn rate(self) -> f64 {
        f64::from(self.met) / f64::from(self.total) * 100.0
    }
}

/// State carried from one record to the next.
#[derive(Debug, Default)]
struct StreakAccumulator {
    current_streak: u32,
    longest_streak: u32,
    total_met: u32,
    overshoot_sum: f64,
    last_completion: Option<Timestamp>,
    last_goal_met: Option<Timestamp>,
    // First-seen order; this is the tie-break for best_interval.
    intervals: Vec<(String, IntervalTally)>,
}

impl StreakAccumulator {
    fn tally_mut(&mut self, label: &str) -> &mut IntervalTally {
        let idx = match self.intervals.iter().position(|(l, _)| l == label) {
            Some(idx) => idx,
            None => {
                self.intervals
                    .push((label.to_owned(), IntervalTally::default()));
                self.intervals.len() - 1
            }
        };
        &mut self.intervals[idx].1
    }

    fn observe(mut self, record: &GoalRecord, is_last: bool) -> Self {
        self.tally_mut(&record.interval).total += 1;

        if !record.was_completed {
            self.current_streak = 0;
            self.last_completion = None;
            return self;
        }

        self.tally_mut(&record.interval).met += 1;
        self.total_met += 1;

        if record.target > 0 && record.achieved > record.target {
            #[allow(clippy::cast_precision_loss)]
            let overshoot =
                (record.achieved - record.target) as f64 / record.target as f64 * 100.0;
            self.overshoot_sum += overshoot;
        }

        let continues = self.last_completion.is_none_or(|last| {
            record.end_date.duration_since(last) <= max_gap_for(&record.interval)
        });
        if continues {
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);
        } else {
            self.current_streak = 1;
        }
        self.last_completion = Some(record.end_date);

        if is_last {
            self.last_goal_met = Some(record.end_date);
        }
        self
    }

    /// Highest positive completion rate; ties keep the first-seen label.
    /// Empty when no interval has a met record.
    fn best_interval(&self) -> String {
        let mut best: Option<&str> = None;
        let mut best_rate = 0.0;
        for (label, tally) in &self.intervals {
            if tally.total == 0 {
                continue;
            }
            let rate = tally.rate();
            if rate > best_rate {
                best = Some(label.as_str());
                best_rate = rate;
            }
        }
        best.map(str::to_owned).unwrap_or_default()
    }

    fn finish(self, total_goals_set: u32) -> GoalStats {
        let average_overshoot = if self.total_met > 0 {
            self.overshoot_sum / f64::from(self.total_met)
        } else {
            0.0
        };

        GoalStats {
            current_goal_streak: self.current_streak,
            longest_goal_streak: self.longest_streak,
            total_goals_set,
            total_goals_met: self.total_met,
            goal_completion_rate: f64::from(self.total_met) / f64::from(total_goals_set) * 100.0,
            average_overshoot,
            best_interval: self.best_interval(),
            last_goal_met: self.last_goal_met,
        }
    }
}

/// Compute streak and completion statistics over `records`.
///
/// Records may arrive in any order; they are stably sorted by `end_date`, so
/// records sharing an `end_date` keep the order they were given in. Each
/// record's stored `was_completed` flag is trusted.
///
/// A missed record resets the current streak to zero. A met record extends
/// the streak when it ends within its interval's maximum gap of the previous
/// completion, and otherwise starts a new streak of one. `last_goal_met` is
/// only set when the chronologically last record was met.
pub fn compute_goal_stats(records: &[GoalRecord]) -> GoalStats {
    if records.is_empty() {
        return GoalStats::default();
    }

    let mut sorted: Vec<&GoalRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.end_date);

    let last_idx = sorted.len() - 1;
    let acc = sorted
        .iter()
        .enumerate()
        .fold(StreakAccumulator::default(), |acc, (i, record)| {
            acc.observe(record, i == last_idx)
        });

    acc.finish(u32::try_from(records.len()).unwrap_or(u32::MAX))
}
