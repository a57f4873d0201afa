//! Core domain types for the dose tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Medications and the doses (obligations) they generate
//! - Per-day completion records
//! - Progress state (points, streak, full-day markers)
//! - Read-only day views handed to the presentation layer

use crate::CalendarDay;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Medication and Obligation Types
// ============================================================================

/// Time-of-day slot a dose belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    /// Stable lowercase form used inside obligation ids
    pub fn slug(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Evening => "Evening",
        })
    }
}

/// A medication referenced by regimen rules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Medication {
    pub name: String,
    /// Stable identifier component, must not change once doses are logged
    pub slug: String,
    /// Free-text amount, e.g. "1 tablet"
    pub dose: String,
}

impl Medication {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, dose: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            dose: dose.into(),
        }
    }
}

/// Stable identifier of one dose on one day
///
/// Canonical form is `YYYY-MM-DD_<medication slug>_<time of day>`. The day
/// prefix has a fixed width and the time-of-day suffix never contains an
/// underscore, so distinct triples always produce distinct ids.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ObligationId(String);

impl ObligationId {
    pub fn new(day: CalendarDay, medication_slug: &str, time_of_day: TimeOfDay) -> Self {
        Self(format!("{}_{}_{}", day, medication_slug, time_of_day.slug()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObligationId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One required dose, recomputed on demand and never stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obligation {
    pub id: ObligationId,
    pub medication: String,
    pub time_of_day: TimeOfDay,
    pub dose_description: String,
    pub cadence_note: String,
}

impl Obligation {
    pub fn new(
        day: CalendarDay,
        medication: &Medication,
        time_of_day: TimeOfDay,
        cadence_note: &str,
    ) -> Self {
        Self {
            id: ObligationId::new(day, &medication.slug, time_of_day),
            medication: medication.name.clone(),
            time_of_day,
            dose_description: medication.dose.clone(),
            cadence_note: cadence_note.to_string(),
        }
    }

    /// Display label, e.g. "Valvir – 1 tablet"
    pub fn label(&self) -> String {
        format!("{} – {}", self.medication, self.dose_description)
    }
}

// ============================================================================
// Persisted State Types
// ============================================================================

/// Which doses were taken on one day
///
/// Entries only ever go from absent to `true` through the public API.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct CompletionRecord {
    entries: BTreeMap<ObligationId, bool>,
}

impl CompletionRecord {
    pub fn is_completed(&self, id: &ObligationId) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Mark a dose as taken, returning `false` if it already was
    pub fn mark(&mut self, id: ObligationId) -> bool {
        if self.is_completed(&id) {
            return false;
        }
        self.entries.insert(id, true);
        true
    }

    /// Undo a mark that never became durable
    pub(crate) fn revoke(&mut self, id: &ObligationId) {
        self.entries.remove(id);
    }

    /// Number of `true` entries, including ids the regimen no longer generates
    pub fn completion_count(&self) -> usize {
        self.entries.values().filter(|taken| **taken).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Points and streak, persisted across runs
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// One point per newly logged dose, never decremented
    #[serde(default)]
    pub total_points: u64,

    /// Consecutive full days ending at `last_full_day`
    #[serde(default)]
    pub current_streak: u32,

    #[serde(default)]
    pub last_full_day: Option<CalendarDay>,

    /// Days that reached 100% completion; each is counted towards the
    /// streak at most once
    #[serde(default)]
    pub full_days: BTreeSet<CalendarDay>,
}

impl ProgressState {
    pub fn is_full_day(&self, day: CalendarDay) -> bool {
        self.full_days.contains(&day)
    }
}

// ============================================================================
// View Types
// ============================================================================

/// Summary of one day's progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayStatus {
    /// The regimen generates nothing for this day
    NothingDue,
    NotStarted { total: usize },
    InProgress { done: usize, total: usize },
    Complete { total: usize },
}

impl DayStatus {
    pub fn from_counts(done: usize, total: usize) -> Self {
        match (done, total) {
            (_, 0) => DayStatus::NothingDue,
            (0, total) => DayStatus::NotStarted { total },
            (done, total) if done >= total => DayStatus::Complete { total },
            (done, total) => DayStatus::InProgress { done, total },
        }
    }
}

/// A dose together with whether it has been logged
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoseEntry {
    pub obligation: Obligation,
    pub taken: bool,
}

/// Snapshot of one day, in regimen order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayView {
    pub day: CalendarDay,
    pub entries: Vec<DoseEntry>,
    pub status: DayStatus,
}
