//! Project completion forecast.
//!
//! Projects a finish date from the recent task-closing velocity and flags the
//! project as at risk when that date lands after the nearest open deadline.

use crate::domain::entities::Task;
use chrono::{DateTime, Days, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Stored deadline layout, local time.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rendered estimate layout, e.g. `Mar 22, 2025`.
const ESTIMATE_DATE_FORMAT: &str = "%b %-d, %Y";

/// Trailing lookback used to measure velocity.
const VELOCITY_WINDOW_DAYS: i64 = 14;

/// Below this many tasks per day no date is projected.
const MIN_VELOCITY: f64 = 0.01;

pub const COMPLETED_TEXT: &str = "Completed";
pub const INSUFFICIENT_DATA_TEXT: &str = "Insufficient data";

/// Derived forecast. Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCompletionForecast {
    /// e.g. `40% (4/10 tasks)`.
    pub completion_percent_text: String,
    /// `Completed`, `Insufficient data` or `~ Mar 22, 2025`.
    pub estimated_completion_text: String,
    pub at_risk: bool,
    pub completion_percent: f64,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub nearest_pending_deadline: Option<DateTime<Utc>>,
}

/// Parses a stored deadline in the given zone.
///
/// Blank or malformed text yields `None`. A wall time skipped by a DST gap is
/// read one hour later.
pub fn parse_deadline<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, DEADLINE_FORMAT).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// Builds the completion forecast for `tasks` as of `now`.
///
/// Velocity counts completed tasks whose deadline falls in
/// `[now - 14 days, now]`; tasks without a usable deadline are left out of
/// velocity and of the nearest-deadline search but still count toward totals.
pub fn forecast<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> ProjectCompletionForecast
where
    Tz::Offset: fmt::Display,
{
    let tz = now.timezone();
    let window_start = now.clone() - Duration::days(VELOCITY_WINDOW_DAYS);

    let mut completed = 0usize;
    let mut remaining = 0usize;
    let mut recent_completed = 0usize;
    let mut nearest_pending: Option<DateTime<Tz>> = None;

    for task in tasks {
        let done = task.status.is_completed();
        if done {
            completed += 1;
        } else {
            remaining += 1;
        }

        let raw = task.deadline.as_deref().unwrap_or_default();
        let Some(deadline) = parse_deadline(raw, &tz) else {
            if !raw.trim().is_empty() {
                debug!(task_id = task.id, deadline = raw, "ignoring unparseable deadline");
            }
            continue;
        };

        if done {
            if deadline >= window_start && deadline <= *now {
                recent_completed += 1;
            }
        } else if nearest_pending.as_ref().is_none_or(|n| deadline < *n) {
            nearest_pending = Some(deadline);
        }
    }

    let total = tasks.len();
    let completion_percent = if total == 0 {
        0.0
    } else {
        completed as f64 * 100.0 / total as f64
    };
    let completion_percent_text = format!(
        "{:.0}% ({}/{} tasks)",
        completion_percent, completed, total
    );

    let velocity = recent_completed as f64 / VELOCITY_WINDOW_DAYS as f64;
    let (estimate, estimated_completion_text) = if remaining == 0 {
        (Some(now.clone()), COMPLETED_TEXT.to_string())
    } else if velocity > MIN_VELOCITY {
        let days = (remaining as f64 / velocity).ceil() as u64;
        let estimate = now
            .clone()
            .checked_add_days(Days::new(days))
            .unwrap_or_else(|| now.clone() + Duration::days(days as i64));
        let text = format!("~ {}", estimate.format(ESTIMATE_DATE_FORMAT));
        (Some(estimate), text)
    } else {
        (None, INSUFFICIENT_DATA_TEXT.to_string())
    };

    let at_risk = matches!(
        (&estimate, &nearest_pending),
        (Some(estimate), Some(deadline)) if estimate > deadline
    );

    ProjectCompletionForecast {
        completion_percent_text,
        estimated_completion_text,
        at_risk,
        completion_percent,
        estimated_completion: estimate.map(|dt| dt.with_timezone(&Utc)),
        nearest_pending_deadline: nearest_pending.map(|dt| dt.with_timezone(&Utc)),
    }
}
