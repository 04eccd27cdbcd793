//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI drives the weekly dashboard use case.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Resolve the user, load the weekly summary and render it. Returns when done.
    async fn run(&self) -> Result<(), DomainError>;
}
