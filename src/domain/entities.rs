//! Domain entities. Pure data structures for the core business.
//!
//! No database types here; adapters map rows into these.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task. Stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    NotDone,
}

impl TaskStatus {
    /// Maps the stored integer code. Unknown codes read as pending.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Completed,
            2 => Self::NotDone,
            _ => Self::Pending,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Completed => 1,
            Self::NotDone => 2,
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

/// A task owned by a user. Read-only to the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub status: TaskStatus,
    /// Raw deadline text in local time (`yyyy-MM-dd HH:mm`). May be blank or malformed.
    #[serde(default)]
    pub deadline: Option<String>,
    pub owner_id: i64,
}

/// A timed study session. Times are epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub task_id: i64,
    pub start_time: i64,
    /// `None` while the session is still running.
    #[serde(default)]
    pub end_time: Option<i64>,
    /// Duration in milliseconds; 0 until the session ends.
    #[serde(default)]
    pub duration: i64,
}

impl StudySession {
    /// Duration clamped to zero; stored values can be negative after clock changes.
    pub fn focused_millis(&self) -> i64 {
        self.duration.max(0)
    }
}

/// Planned vs completed session counts for one window.
///
/// The two counts come from independent columns, so `completed_count` may
/// exceed `planned_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlanCompletion {
    pub planned_count: i64,
    pub completed_count: i64,
}

impl SessionPlanCompletion {
    pub fn new(planned_count: i64, completed_count: i64) -> Self {
        Self {
            planned_count,
            completed_count,
        }
    }
}
