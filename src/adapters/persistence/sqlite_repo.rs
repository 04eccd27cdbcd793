//! SQLite-backed store via libsql. Implements TaskStorePort and SessionStatsPort.
//!
//! One database file (`study.db`) holds `tasks` and `study_sessions`. Session
//! times and durations are epoch milliseconds; deadlines are local-time text.
//! Window aggregates are computed in SQL.

use crate::domain::{DomainError, SessionPlanCompletion, StudySession, Task, TaskStatus, WeekRange};
use crate::ports::{SessionStatsPort, TaskStorePort};
use libsql::{Database, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DB_FILE_NAME: &str = "study.db";

const TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    deadline TEXT,
    status INTEGER DEFAULT 0,
    user_id INTEGER
)"#;
const TASKS_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks (user_id)";

const SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS study_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER,
    start_time INTEGER,
    end_time INTEGER,
    duration INTEGER
)"#;
const SESSIONS_START_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sessions_start ON study_sessions (start_time)";
const SESSIONS_END_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sessions_end ON study_sessions (end_time)";

const COUNT_STARTED_SQL: &str =
    "SELECT COUNT(*) FROM study_sessions WHERE start_time >= ?1 AND start_time < ?2";
const FOCUSED_MILLIS_SQL: &str = r#"
SELECT COALESCE(SUM(MAX(duration, 0)), 0)
FROM study_sessions
WHERE start_time >= ?1 AND start_time < ?2
"#;
const AVERAGE_MILLIS_SQL: &str = r#"
SELECT COALESCE(AVG(MAX(duration, 0)), 0.0)
FROM study_sessions
WHERE start_time >= ?1 AND start_time < ?2 AND end_time IS NOT NULL
"#;
const PLANNED_VS_COMPLETED_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM study_sessions WHERE start_time >= ?1 AND start_time < ?2),
    (SELECT COUNT(*) FROM study_sessions WHERE end_time >= ?1 AND end_time < ?2)
"#;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// SQLite store. Safe to share via Arc; each call opens its own connection.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) `study.db` under `base_dir` and ensure the schema exists.
    ///
    /// Sets WAL mode and synchronous=NORMAL so the task screens can write while
    /// the dashboard reads.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Repo(e.to_string()))?;
        let db_path = base.join(DB_FILE_NAME);
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Repo(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows
                .next()
                .await
                .map_err(|e| DomainError::Repo(e.to_string()))?
                .is_some()
            {}
        }

        for ddl in [
            TASKS_TABLE,
            TASKS_INDEX,
            SESSIONS_TABLE,
            SESSIONS_START_INDEX,
            SESSIONS_END_INDEX,
        ] {
            conn.execute(ddl, ())
                .await
                .map_err(|e| DomainError::Repo(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert a task, keeping its id.
    pub async fn insert_task(&self, task: &Task) -> Result<(), DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        conn.execute(
            "INSERT INTO tasks (id, title, deadline, status, user_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id,
                task.title.as_str(),
                task.deadline.as_deref(),
                task.status.code(),
                task.owner_id
            ],
        )
        .await
        .map_err(|e| DomainError::Repo(e.to_string()))?;
        Ok(())
    }

    /// Insert a study session, keeping its id.
    pub async fn insert_session(&self, session: &StudySession) -> Result<(), DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO study_sessions (id, task_id, start_time, end_time, duration)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                session.id,
                session.task_id,
                session.start_time,
                session.end_time,
                session.duration
            ],
        )
        .await
        .map_err(|e| DomainError::Repo(e.to_string()))?;
        Ok(())
    }

    /// Run a window query that yields exactly one row.
    async fn window_row(&self, sql: &str, range: &WeekRange) -> Result<Row, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        let mut rows = conn
            .query(sql, params![range.start_millis(), range.end_millis()])
            .await
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        rows.next()
            .await
            .map_err(|e| DomainError::SessionStore(e.to_string()))?
            .ok_or_else(|| DomainError::SessionStore("aggregate query returned no row".into()))
    }

    fn row_to_task(row: &Row) -> Result<Task, DomainError> {
        let id: i64 = row
            .get(0)
            .map_err(|e| DomainError::TaskStore(e.to_string()))?;
        let title: String = row.get::<String>(1).unwrap_or_default();
        let deadline: Option<String> = row.get(2).ok();
        let status: i64 = row.get(3).unwrap_or_default();
        let owner_id: i64 = row
            .get(4)
            .map_err(|e| DomainError::TaskStore(e.to_string()))?;
        Ok(Task {
            id,
            title,
            status: TaskStatus::from_code(status),
            deadline,
            owner_id,
        })
    }
}

#[async_trait::async_trait]
impl TaskStorePort for SqliteRepo {
    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::TaskStore(e.to_string()))?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, title, deadline, status, user_id
                FROM tasks
                WHERE user_id = ?1
                ORDER BY id
                "#,
                params![user_id],
            )
            .await
            .map_err(|e| DomainError::TaskStore(e.to_string()))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::TaskStore(e.to_string()))?
        {
            tasks.push(Self::row_to_task(&row)?);
        }
        debug!(user_id, count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }
}

#[async_trait::async_trait]
impl SessionStatsPort for SqliteRepo {
    async fn session_count(&self, range: &WeekRange) -> Result<i64, DomainError> {
        let row = self.window_row(COUNT_STARTED_SQL, range).await?;
        row.get(0)
            .map_err(|e| DomainError::SessionStore(e.to_string()))
    }

    async fn total_focused_minutes(&self, range: &WeekRange) -> Result<i64, DomainError> {
        let row = self.window_row(FOCUSED_MILLIS_SQL, range).await?;
        let millis: i64 = row
            .get(0)
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        Ok(millis / MILLIS_PER_MINUTE)
    }

    async fn average_session_minutes(&self, range: &WeekRange) -> Result<f64, DomainError> {
        let row = self.window_row(AVERAGE_MILLIS_SQL, range).await?;
        let millis: f64 = row
            .get(0)
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        Ok(millis / MILLIS_PER_MINUTE as f64)
    }

    async fn planned_vs_completed(
        &self,
        range: &WeekRange,
    ) -> Result<SessionPlanCompletion, DomainError> {
        let row = self.window_row(PLANNED_VS_COMPLETED_SQL, range).await?;
        let planned: i64 = row
            .get(0)
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        let completed: i64 = row
            .get(1)
            .map_err(|e| DomainError::SessionStore(e.to_string()))?;
        Ok(SessionPlanCompletion::new(planned, completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeekCalendar;
    use chrono::{TimeZone, Utc, Weekday};

    const MINUTE: i64 = 60_000;

    fn week() -> WeekRange {
        WeekCalendar::new(Utc, Weekday::Mon)
            .week_containing(Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap())
    }

    fn session(id: i64, start: i64, duration: Option<i64>) -> StudySession {
        StudySession {
            id,
            task_id: 1,
            start_time: start,
            end_time: duration.map(|d| start + d.max(0)),
            duration: duration.unwrap_or(0),
        }
    }

    #[tokio::test]
    async fn test_tasks_round_trip_through_schema() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        assert!(repo.db_path().ends_with(DB_FILE_NAME));

        for task in [
            Task {
                id: 1,
                title: "Essay draft".into(),
                status: TaskStatus::NotDone,
                deadline: Some("2025-03-14 09:00".into()),
                owner_id: 5,
            },
            Task {
                id: 2,
                title: "Lab report".into(),
                status: TaskStatus::Completed,
                deadline: None,
                owner_id: 5,
            },
            Task {
                id: 3,
                title: "Someone else".into(),
                status: TaskStatus::Pending,
                deadline: None,
                owner_id: 6,
            },
        ] {
            repo.insert_task(&task).await.unwrap();
        }

        let tasks = repo.list_tasks(5).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::NotDone);
        assert_eq!(tasks[0].deadline.as_deref(), Some("2025-03-14 09:00"));
        assert_eq!(tasks[1].status, TaskStatus::Completed);
        assert!(tasks[1].deadline.is_none());
    }

    #[tokio::test]
    async fn test_window_aggregates_in_sql() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let range = week();
        let start = range.start_millis();

        for s in [
            session(1, start + 60 * MINUTE, Some(25 * MINUTE + 59_000)),
            session(2, start + 180 * MINUTE, Some(50 * MINUTE)),
            session(3, start + 300 * MINUTE, Some(-5 * MINUTE)),
            session(4, start + 400 * MINUTE, None),
            session(5, start - 10 * MINUTE, Some(40 * MINUTE)),
            session(6, range.end_millis(), Some(30 * MINUTE)),
        ] {
            repo.insert_session(&s).await.unwrap();
        }

        assert_eq!(repo.session_count(&range).await.unwrap(), 4);
        assert_eq!(repo.total_focused_minutes(&range).await.unwrap(), 75);
        let avg = repo.average_session_minutes(&range).await.unwrap();
        assert!((avg - (75.0 * 60.0 + 59.0) / 60.0 / 3.0).abs() < 1e-9);
        let plan = repo.planned_vs_completed(&range).await.unwrap();
        assert_eq!(plan, SessionPlanCompletion::new(4, 4));
    }

    #[tokio::test]
    async fn test_empty_window() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let range = week();
        assert_eq!(repo.session_count(&range).await.unwrap(), 0);
        assert_eq!(repo.total_focused_minutes(&range).await.unwrap(), 0);
        assert_eq!(repo.average_session_minutes(&range).await.unwrap(), 0.0);
        assert_eq!(
            repo.planned_vs_completed(&range).await.unwrap(),
            SessionPlanCompletion::default()
        );
    }
}
