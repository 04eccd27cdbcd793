//! Persistence adapters. Implement the task and study-session store ports.

pub mod snapshot_json;
pub mod sqlite_repo;

pub use snapshot_json::{Snapshot, SnapshotStore};
pub use sqlite_repo::SqliteRepo;
