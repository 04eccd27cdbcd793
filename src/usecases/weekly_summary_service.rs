//! Weekly summary use case. Composes week windows, session aggregates, KPI
//! cards and the completion forecast into one [`WeeklySummaryResult`].
//!
//! Stateless: every call is a single read-and-compute pass. Store failures are
//! logged here and never reach the caller as errors.

use crate::domain::forecast::forecast;
use crate::domain::kpi::completion_rate;
use crate::domain::summary::{EMPTY_MESSAGE, ERROR_MESSAGE};
use crate::domain::{
    DashboardKpiCard, DomainError, ProjectCompletionForecast, SessionPlanCompletion,
    WeekCalendar, WeekRange, WeeklySummaryResult, build_card,
};
use crate::ports::{SessionStatsPort, TaskStorePort};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Aggregates for one week window.
#[derive(Debug, Clone, Copy, Default)]
struct WindowMetrics {
    session_count: i64,
    focused_minutes: i64,
    average_minutes: f64,
    plan: SessionPlanCompletion,
}

/// Service producing the weekly dashboard for a user.
pub struct WeeklySummaryService<Tz: TimeZone> {
    tasks: Arc<dyn TaskStorePort>,
    sessions: Arc<dyn SessionStatsPort>,
    calendar: WeekCalendar<Tz>,
}

impl<Tz: TimeZone> WeeklySummaryService<Tz>
where
    Tz::Offset: fmt::Display,
{
    pub fn new(
        tasks: Arc<dyn TaskStorePort>,
        sessions: Arc<dyn SessionStatsPort>,
        calendar: WeekCalendar<Tz>,
    ) -> Self {
        Self {
            tasks,
            sessions,
            calendar,
        }
    }

    pub fn calendar(&self) -> &WeekCalendar<Tz> {
        &self.calendar
    }

    /// Summary as of the current system time.
    pub async fn load_weekly_summary(&self, user_id: i64) -> WeeklySummaryResult {
        self.load_weekly_summary_at(user_id, Utc::now()).await
    }

    /// Summary as of `now`. Never fails; store errors become the `Error` state.
    pub async fn load_weekly_summary_at(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> WeeklySummaryResult {
        let forecast = self.build_forecast(user_id, now).await;

        let current_week = self.calendar.current_week_at(now);
        let previous_week = self.calendar.previous_week_at(now);

        let current = match self.collect_metrics(&current_week).await {
            Ok(m) => m,
            Err(e) => return Self::failed(user_id, &e),
        };
        let previous = match self.collect_metrics(&previous_week).await {
            Ok(m) => m,
            Err(e) => return Self::failed(user_id, &e),
        };

        if current.session_count == 0 && previous.session_count == 0 {
            info!(user_id, "no study sessions in current or previous week");
            return WeeklySummaryResult::empty(EMPTY_MESSAGE, forecast);
        }

        info!(
            user_id,
            current_sessions = current.session_count,
            previous_sessions = previous.session_count,
            "weekly summary built"
        );
        WeeklySummaryResult::content(build_cards(&current, &previous), forecast)
    }

    /// Forecast for the user's tasks; `None` when the task store fails.
    async fn build_forecast(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Option<ProjectCompletionForecast> {
        match self.tasks.list_tasks(user_id).await {
            Ok(tasks) => {
                let local_now = now.with_timezone(self.calendar.timezone());
                Some(forecast(&tasks, &local_now))
            }
            Err(e) => {
                warn!(user_id, error = %e, "task store unavailable; forecast omitted");
                None
            }
        }
    }

    async fn collect_metrics(&self, range: &WeekRange) -> Result<WindowMetrics, DomainError> {
        Ok(WindowMetrics {
            session_count: self.sessions.session_count(range).await?,
            focused_minutes: self.sessions.total_focused_minutes(range).await?,
            average_minutes: self.sessions.average_session_minutes(range).await?,
            plan: self.sessions.planned_vs_completed(range).await?,
        })
    }

    fn failed(user_id: i64, cause: &DomainError) -> WeeklySummaryResult {
        error!(user_id, error = %cause, "weekly dashboard aggregation failed");
        WeeklySummaryResult::error(ERROR_MESSAGE)
    }
}

/// The four cards, in display order.
fn build_cards(current: &WindowMetrics, previous: &WindowMetrics) -> Vec<DashboardKpiCard> {
    vec![
        build_card(
            "Sessions this week",
            current.session_count.to_string(),
            current.session_count as f64,
            previous.session_count as f64,
        ),
        build_card(
            "Focused minutes",
            current.focused_minutes.to_string(),
            current.focused_minutes as f64,
            previous.focused_minutes as f64,
        ),
        build_card(
            "Avg session duration",
            format!("{} min", current.average_minutes.round() as i64),
            current.average_minutes,
            previous.average_minutes,
        ),
        build_card(
            "Planned vs completed",
            format!(
                "{} / {}",
                current.plan.completed_count, current.plan.planned_count
            ),
            completion_rate(current.plan.completed_count, current.plan.planned_count),
            completion_rate(previous.plan.completed_count, previous.plan.planned_count),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::{Snapshot, SnapshotStore};
    use crate::domain::forecast::INSUFFICIENT_DATA_TEXT;
    use crate::domain::{StudySession, Task, TaskStatus, Trend};
    use chrono::{Duration, Weekday};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MINUTE: i64 = 60_000;
    const USER: i64 = 7;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 15, 0, 0).unwrap()
    }

    fn calendar() -> WeekCalendar<Utc> {
        WeekCalendar::new(Utc, Weekday::Mon)
    }

    fn finished(id: i64, start: DateTime<Utc>, minutes: i64) -> StudySession {
        let start = start.timestamp_millis();
        StudySession {
            id,
            task_id: 1,
            start_time: start,
            end_time: Some(start + minutes * MINUTE),
            duration: minutes * MINUTE,
        }
    }

    fn tasks() -> Vec<Task> {
        (0..10)
            .map(|id| Task {
                id,
                title: format!("task {id}"),
                status: if id < 4 {
                    TaskStatus::Completed
                } else {
                    TaskStatus::Pending
                },
                deadline: None,
                owner_id: USER,
            })
            .collect()
    }

    fn service_over(snapshot: Snapshot) -> WeeklySummaryService<Utc> {
        let store = Arc::new(SnapshotStore::from_snapshot(snapshot));
        WeeklySummaryService::new(store.clone(), store, calendar())
    }

    struct FailingTasks;

    #[async_trait::async_trait]
    impl TaskStorePort for FailingTasks {
        async fn list_tasks(&self, _user_id: i64) -> Result<Vec<Task>, DomainError> {
            Err(DomainError::TaskStore("disk I/O error".into()))
        }
    }

    /// Fails on the Nth aggregate call (0-based).
    struct FailingStats {
        fail_at: usize,
        calls: AtomicUsize,
    }

    impl FailingStats {
        fn check(&self) -> Result<(), DomainError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
                return Err(DomainError::SessionStore("database is locked".into()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl SessionStatsPort for FailingStats {
        async fn session_count(&self, _range: &WeekRange) -> Result<i64, DomainError> {
            self.check().map(|_| 3)
        }

        async fn total_focused_minutes(&self, _range: &WeekRange) -> Result<i64, DomainError> {
            self.check().map(|_| 90)
        }

        async fn average_session_minutes(&self, _range: &WeekRange) -> Result<f64, DomainError> {
            self.check().map(|_| 30.0)
        }

        async fn planned_vs_completed(
            &self,
            _range: &WeekRange,
        ) -> Result<SessionPlanCompletion, DomainError> {
            self.check().map(|_| SessionPlanCompletion::new(3, 3))
        }
    }

    #[tokio::test]
    async fn test_no_sessions_in_either_week_is_empty() {
        let service = service_over(Snapshot {
            tasks: tasks(),
            sessions: vec![finished(1, now() - Duration::days(30), 25)],
        });

        let result = service.load_weekly_summary_at(USER, now()).await;
        assert!(matches!(result, WeeklySummaryResult::Empty { .. }));
        assert!(result.cards().is_empty());
        assert_eq!(result.message(), Some(EMPTY_MESSAGE));
        let forecast = result.forecast().unwrap();
        assert_eq!(forecast.completion_percent_text, "40% (4/10 tasks)");
        assert_eq!(forecast.estimated_completion_text, INSUFFICIENT_DATA_TEXT);
    }

    #[tokio::test]
    async fn test_content_cards_in_fixed_order() {
        let week_start = calendar().current_week_at(now()).start();
        let last_week_start = calendar().previous_week_at(now()).start();
        let service = service_over(Snapshot {
            tasks: tasks(),
            sessions: vec![
                finished(1, week_start + Duration::hours(9), 30),
                finished(2, week_start + Duration::hours(20), 50),
                finished(3, last_week_start + Duration::hours(9), 40),
                finished(4, last_week_start + Duration::hours(30), 40),
            ],
        });

        let result = service.load_weekly_summary_at(USER, now()).await;
        let cards = result.cards();
        assert_eq!(result.state_name(), "content");
        let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Sessions this week",
                "Focused minutes",
                "Avg session duration",
                "Planned vs completed"
            ]
        );

        assert_eq!(cards[0].value, "2");
        assert_eq!(cards[0].trend, Trend::Neutral);
        assert_eq!(cards[0].delta_text, "+0% vs last week");

        assert_eq!(cards[1].value, "80");
        assert_eq!(cards[1].trend, Trend::Neutral);

        assert_eq!(cards[2].value, "40 min");
        assert_eq!(cards[3].value, "2 / 2");
        assert!(result.forecast().is_some());
    }

    #[tokio::test]
    async fn test_first_week_with_sessions_trends_up() {
        let week_start = calendar().current_week_at(now()).start();
        let service = service_over(Snapshot {
            tasks: vec![],
            sessions: vec![finished(1, week_start + Duration::hours(1), 45)],
        });

        let result = service.load_weekly_summary_at(USER, now()).await;
        let cards = result.cards();
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.trend == Trend::Up));
        assert!(cards[0].delta_text.contains("+100%"));
    }

    #[tokio::test]
    async fn test_aggregator_failure_is_error_state() {
        for fail_at in [0, 3, 7] {
            let service = WeeklySummaryService::new(
                Arc::new(SnapshotStore::from_snapshot(Snapshot::default())),
                Arc::new(FailingStats {
                    fail_at,
                    calls: AtomicUsize::new(0),
                }),
                calendar(),
            );

            let result = service.load_weekly_summary_at(USER, now()).await;
            assert_eq!(result, WeeklySummaryResult::error(ERROR_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_task_store_failure_drops_only_forecast() {
        let service = WeeklySummaryService::new(
            Arc::new(FailingTasks),
            Arc::new(FailingStats {
                fail_at: usize::MAX,
                calls: AtomicUsize::new(0),
            }),
            calendar(),
        );

        let result = service.load_weekly_summary_at(USER, now()).await;
        assert_eq!(result.cards().len(), 4);
        assert!(result.forecast().is_none());
    }

    #[tokio::test]
    async fn test_load_weekly_summary_uses_system_clock() {
        let service = service_over(Snapshot::default());
        let result = service.load_weekly_summary(USER).await;
        assert!(matches!(result, WeeklySummaryResult::Empty { .. }));
    }
}
