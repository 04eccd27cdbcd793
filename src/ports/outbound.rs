//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, SessionPlanCompletion, Task, WeekRange};

/// Task store. Read-only from the analytics engine's point of view.
#[async_trait::async_trait]
pub trait TaskStorePort: Send + Sync {
    /// All tasks owned by `user_id`, in any status.
    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, DomainError>;
}

/// Study-session aggregates over a half-open `[start, end)` window.
///
/// A session belongs to a window when its start time falls inside it, except
/// for the completed count, which goes by end time.
#[async_trait::async_trait]
pub trait SessionStatsPort: Send + Sync {
    /// Number of sessions started in the window.
    async fn session_count(&self, range: &WeekRange) -> Result<i64, DomainError>;

    /// Sum of non-negative session durations in whole minutes (remainder truncated).
    async fn total_focused_minutes(&self, range: &WeekRange) -> Result<i64, DomainError>;

    /// Mean duration in minutes of finished sessions; 0 when there are none.
    async fn average_session_minutes(&self, range: &WeekRange) -> Result<f64, DomainError>;

    /// Sessions started (planned) vs sessions finished (completed) in the window.
    async fn planned_vs_completed(
        &self,
        range: &WeekRange,
    ) -> Result<SessionPlanCompletion, DomainError>;
}
