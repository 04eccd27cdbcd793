//! Application use cases. Orchestrate domain logic via ports.

pub mod weekly_summary_service;

pub use weekly_summary_service::WeeklySummaryService;
