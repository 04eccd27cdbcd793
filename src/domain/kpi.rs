//! Week-over-week KPI cards.
//!
//! A card compares a metric's current and previous value, renders the signed
//! percentage change and classifies the trend with a small dead-band.

use serde::Serialize;

/// Values closer to zero than this are treated as zero.
const ZERO_EPSILON: f64 = 0.0001;

/// Delta reported when a metric goes from nothing to something.
const FROM_ZERO_DELTA: f64 = 100.0;

/// Deltas within ±this many percent classify as neutral.
const TREND_DEAD_BAND: f64 = 0.5;

const COMPARISON_SUFFIX: &str = "vs last week";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn from_delta(delta_percent: f64) -> Self {
        if delta_percent > TREND_DEAD_BAND {
            Self::Up
        } else if delta_percent < -TREND_DEAD_BAND {
            Self::Down
        } else {
            Self::Neutral
        }
    }
}

/// One displayable KPI card. Built fresh per summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardKpiCard {
    pub label: String,
    pub value: String,
    pub delta_text: String,
    pub trend: Trend,
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline yields 0 when `current` is also zero and a flat 100
/// otherwise, regardless of magnitude. Never returns NaN or infinity.
pub fn delta_percent(current: f64, previous: f64) -> f64 {
    if !current.is_finite() || !previous.is_finite() {
        return 0.0;
    }
    if previous.abs() < ZERO_EPSILON {
        return if current.abs() < ZERO_EPSILON {
            0.0
        } else {
            FROM_ZERO_DELTA
        };
    }
    let delta = (current - previous) / previous * 100.0;
    if delta.is_finite() { delta } else { 0.0 }
}

/// `completed / planned` as a percentage; 0 when nothing was planned.
/// Values above 100 are kept.
pub fn completion_rate(completed: i64, planned: i64) -> f64 {
    if planned <= 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / planned as f64
}

/// Signed whole-percent text, e.g. `+12% vs last week`. Zero renders as `+0%`.
pub fn format_delta(delta_percent: f64) -> String {
    let rounded = delta_percent.round() as i64;
    format!("{:+}% {}", rounded, COMPARISON_SUFFIX)
}

pub fn build_card(
    label: impl Into<String>,
    display_value: impl Into<String>,
    current: f64,
    previous: f64,
) -> DashboardKpiCard {
    let delta = delta_percent(current, previous);
    DashboardKpiCard {
        label: label.into(),
        value: display_value.into(),
        delta_text: format_delta(delta),
        trend: Trend::from_delta(delta),
    }
}
