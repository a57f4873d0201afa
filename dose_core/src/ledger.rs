//! Progress ledger: points and full-day streaks.
//!
//! Every newly logged dose is worth one point. When the last outstanding
//! dose of a day is logged the day becomes "full" and the streak is
//! extended or restarted:
//! - first full day ever → streak 1
//! - previous full day was yesterday → streak + 1
//! - anything else (a gap, or back-filling an earlier day) → streak 1
//!
//! A day is counted at most once; its marker is never cleared except by a
//! full wipe. Gaps are measured between calendar days, never timestamps.

use crate::store::ProgressStore;
use crate::{CalendarDay, CompletionRecord, ProgressState, RegimenRuleSet, Result};

/// Result of crediting one newly logged dose
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub progress: ProgressState,
    /// True when this dose made its day full for the first time
    pub day_completed: bool,
}

/// Mark `day` full and update the streak
///
/// Returns `false` without touching the state if the day was already full.
pub fn apply_full_day(state: &mut ProgressState, day: CalendarDay) -> bool {
    if !state.full_days.insert(day) {
        return false;
    }

    state.current_streak = match state.last_full_day {
        Some(last) if CalendarDay::days_between(last, day) == 1 => state.current_streak + 1,
        _ => 1,
    };
    state.last_full_day = Some(day);
    true
}

/// Credits completions against the current regimen
pub struct ProgressLedger<'a> {
    regimen: &'a RegimenRuleSet,
}

impl<'a> ProgressLedger<'a> {
    pub fn new(regimen: &'a RegimenRuleSet) -> Self {
        Self { regimen }
    }

    /// Credit a dose that was just durably marked in `record`
    ///
    /// Must only be called for a newly true entry, never for a repeat.
    /// Ids in `record` that the regimen no longer generates for `day` do
    /// not count towards the day being full.
    pub fn record_completion<S: ProgressStore>(
        &self,
        store: &mut S,
        day: CalendarDay,
        record: &CompletionRecord,
    ) -> Result<LedgerUpdate> {
        let mut progress = store.load_progress()?;
        progress.total_points = progress.total_points.saturating_add(1);

        let obligations = self.regimen.obligations_for(day);
        let done = obligations
            .iter()
            .filter(|o| record.is_completed(&o.id))
            .count();

        let day_completed = !obligations.is_empty()
            && done == obligations.len()
            && apply_full_day(&mut progress, day);

        store.save_progress(&progress)?;

        if day_completed {
            tracing::info!(
                "Full day {} complete, streak now {}",
                day,
                progress.current_streak
            );
        } else {
            tracing::debug!(
                "Logged dose on {} ({}/{} done), {} points",
                day,
                done,
                obligations.len(),
                progress.total_points
            );
        }

        Ok(LedgerUpdate {
            progress,
            day_completed,
        })
    }
}
