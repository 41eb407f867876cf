//! Goal interval labels and the calendar windows they describe.
//!
//! Interval labels are stored as open strings on goal records, so every
//! helper here accepts a `&str` and falls back to a default for labels it
//! does not recognise.

use anyhow::{Context, Result};
use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, ToSpan};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Streak gap used for interval labels outside the known four.
pub const DEFAULT_MAX_GAP: SignedDuration = SignedDuration::from_hours(7 * 24);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GoalInterval {
    Daily,
    Weekly,
    Monthly,
    #[default]
    Yearly,
}

impl GoalInterval {
    /// Longest distance between two completed records' end dates that still
    /// counts as one unbroken streak.
    pub const fn max_gap(self) -> SignedDuration {
        match self {
            Self::Daily => SignedDuration::from_hours(24),
            Self::Weekly => SignedDuration::from_hours(7 * 24),
            Self::Monthly => SignedDuration::from_hours(31 * 24),
            Self::Yearly => SignedDuration::from_hours(365 * 24),
        }
    }

    /// First day of the window containing `date`.
    fn window_start(self, date: Date) -> Result<Date> {
        match self {
            Self::Daily => Ok(date),
            Self::Weekly => {
                let back = i64::from(date.weekday().to_sunday_zero_offset());
                date.checked_sub(back.days())
                    .context("Week start is outside the supported date range")
            }
            Self::Monthly => Ok(date.first_of_month()),
            Self::Yearly => Ok(date.first_of_year()),
        }
    }
}

/// Streak gap for a raw interval label.
pub fn max_gap_for(label: &str) -> SignedDuration {
    label
        .parse::<GoalInterval>()
        .map_or(DEFAULT_MAX_GAP, GoalInterval::max_gap)
}

/// Start of the UTC calendar window (day, Sunday-based week, month or year)
/// that contains `at`. Unknown labels use the yearly window.
pub fn interval_start(at: Timestamp, label: &str) -> Result<Timestamp> {
    let interval = label.parse::<GoalInterval>().unwrap_or(GoalInterval::Yearly);
    let date = at.to_zoned(TimeZone::UTC).date();
    let start = interval.window_start(date)?;

    Ok(start
        .to_zoned(TimeZone::UTC)
        .context("Failed to resolve interval start in UTC")?
        .timestamp())
}

/// Last representable instant of `at`'s UTC day.
pub fn end_of_day(at: Timestamp) -> Result<Timestamp> {
    let date = at.to_zoned(TimeZone::UTC).date();

    Ok(date
        .at(23, 59, 59, 999_999_999)
        .to_zoned(TimeZone::UTC)
        .context("Failed to resolve end of day in UTC")?
        .timestamp())
}
