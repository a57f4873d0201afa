#![forbid(unsafe_code)]

//! Core domain model and business logic for the dosetrack medication tracker.
//!
//! This crate provides:
//! - Calendar-day arithmetic
//! - The regimen rule set (which doses are due on a day)
//! - Completion records and the progress ledger (points, streaks)
//! - Persistence behind the `ProgressStore` interface
//! - Command handlers for front ends

pub mod day;
pub mod types;
pub mod error;
pub mod regimen;
pub mod config;
pub mod logging;
pub mod persist;
pub mod store;
pub mod ledger;
pub mod completion;
pub mod tracker;

// Re-export commonly used types
pub use day::CalendarDay;
pub use error::{Error, Result};
pub use types::*;
pub use regimen::{build_default_regimen, DoseRule, RegimenRuleSet};
pub use config::Config;
pub use store::{FileStore, MemoryStore, ProgressStore};
pub use ledger::{LedgerUpdate, ProgressLedger};
pub use completion::{CompletionStore, MarkOutcome};
pub use tracker::{DoseLogged, Tracker};
