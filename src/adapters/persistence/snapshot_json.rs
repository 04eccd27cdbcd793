//! Implements TaskStorePort and SessionStatsPort over a JSON snapshot file.
//!
//! The whole snapshot is held in memory; aggregates are computed on read with
//! the same window rules as the SQLite store.

use crate::domain::{DomainError, SessionPlanCompletion, StudySession, Task, WeekRange};
use crate::ports::{SessionStatsPort, TaskStorePort};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Snapshot layout: `{"tasks": [...], "sessions": [...]}`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

/// JSON file-backed, read-mostly store.
pub struct SnapshotStore {
    path: Option<PathBuf>,
    cache: tokio::sync::RwLock<Snapshot>,
}

impl SnapshotStore {
    /// Store bound to `path`. Call [`SnapshotStore::load`] before use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            cache: tokio::sync::RwLock::new(Snapshot::default()),
        }
    }

    /// Store over an in-memory snapshot, not backed by a file.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            path: None,
            cache: tokio::sync::RwLock::new(snapshot),
        }
    }

    /// Load the snapshot from disk, replacing the cached contents.
    pub async fn load(&self) -> Result<(), DomainError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Snapshot(format!("read {}: {}", path.display(), e)))?;
        let data: Snapshot = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Snapshot(format!("parse {}: {}", path.display(), e)))?;
        info!(
            path = %path.display(),
            tasks = data.tasks.len(),
            sessions = data.sessions.len(),
            "snapshot loaded"
        );
        *self.cache.write().await = data;
        Ok(())
    }

    async fn sessions_started_in(&self, range: &WeekRange) -> Vec<StudySession> {
        let cache = self.cache.read().await;
        cache
            .sessions
            .iter()
            .filter(|s| range.contains(s.start_time))
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl TaskStorePort for SnapshotStore {
    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache
            .tasks
            .iter()
            .filter(|t| t.owner_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl SessionStatsPort for SnapshotStore {
    async fn session_count(&self, range: &WeekRange) -> Result<i64, DomainError> {
        Ok(self.sessions_started_in(range).await.len() as i64)
    }

    async fn total_focused_minutes(&self, range: &WeekRange) -> Result<i64, DomainError> {
        let millis: i64 = self
            .sessions_started_in(range)
            .await
            .iter()
            .map(StudySession::focused_millis)
            .sum();
        Ok(millis / MILLIS_PER_MINUTE)
    }

    async fn average_session_minutes(&self, range: &WeekRange) -> Result<f64, DomainError> {
        let finished: Vec<i64> = self
            .sessions_started_in(range)
            .await
            .iter()
            .filter(|s| s.end_time.is_some())
            .map(StudySession::focused_millis)
            .collect();
        if finished.is_empty() {
            return Ok(0.0);
        }
        let mean_millis = finished.iter().sum::<i64>() as f64 / finished.len() as f64;
        Ok(mean_millis / MILLIS_PER_MINUTE as f64)
    }

    async fn planned_vs_completed(
        &self,
        range: &WeekRange,
    ) -> Result<SessionPlanCompletion, DomainError> {
        let cache = self.cache.read().await;
        let planned = cache
            .sessions
            .iter()
            .filter(|s| range.contains(s.start_time))
            .count();
        let completed = cache
            .sessions
            .iter()
            .filter(|s| s.end_time.is_some_and(|end| range.contains(end)))
            .count();
        Ok(SessionPlanCompletion::new(planned as i64, completed as i64))
    }
}
