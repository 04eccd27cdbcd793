//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod forecast;
pub mod kpi;
pub mod summary;
pub mod week;

pub use entities::{SessionPlanCompletion, StudySession, Task, TaskStatus};
pub use errors::DomainError;
pub use forecast::{ProjectCompletionForecast, forecast};
pub use kpi::{DashboardKpiCard, Trend, build_card};
pub use summary::WeeklySummaryResult;
pub use week::{WeekCalendar, WeekRange};
