//! Infrastructure adapters. Implement ports.
//!
//! SQLite and JSON snapshot stores, terminal UI. Map errors to DomainError.

pub mod persistence;
pub mod ui;
