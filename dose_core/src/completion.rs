//! Completion store: which doses were taken, per day.
//!
//! Marking a dose is idempotent. A new mark is written to storage before
//! anything else happens, and only then credited by the
//! [`ProgressLedger`](crate::ledger::ProgressLedger). If crediting fails the
//! mark is rolled back so the action can be retried as a whole.

use crate::ledger::{LedgerUpdate, ProgressLedger};
use crate::store::ProgressStore;
use crate::{
    CalendarDay, DayStatus, DayView, DoseEntry, ObligationId, ProgressState, RegimenRuleSet,
    Result,
};

/// Outcome of marking a dose as taken
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The dose was already logged; nothing changed
    AlreadyLogged,
    /// The dose was newly logged and credited
    Logged(LedgerUpdate),
}

/// Owns the persisted state together with the regimen it is judged against
pub struct CompletionStore<S: ProgressStore> {
    store: S,
    regimen: RegimenRuleSet,
}

impl<S: ProgressStore> CompletionStore<S> {
    pub fn new(store: S, regimen: RegimenRuleSet) -> Self {
        Self { store, regimen }
    }

    pub fn regimen(&self) -> &RegimenRuleSet {
        &self.regimen
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn is_completed(&self, day: CalendarDay, id: &ObligationId) -> Result<bool> {
        Ok(self.store.load_record(day)?.is_completed(id))
    }

    /// Number of logged doses on `day`, stale ids included
    pub fn completion_count(&self, day: CalendarDay) -> Result<usize> {
        Ok(self.store.load_record(day)?.completion_count())
    }

    /// Mark a dose as taken and credit it
    ///
    /// Ids the regimen does not generate for `day` are accepted and earn a
    /// point, but never count towards the day being full.
    pub fn mark_completed(&mut self, day: CalendarDay, id: &ObligationId) -> Result<MarkOutcome> {
        let mut record = self.store.load_record(day)?;
        if !record.mark(id.clone()) {
            tracing::debug!("Dose {} already logged on {}", id, day);
            return Ok(MarkOutcome::AlreadyLogged);
        }

        self.store.save_record(day, &record)?;

        let ledger = ProgressLedger::new(&self.regimen);
        match ledger.record_completion(&mut self.store, day, &record) {
            Ok(update) => Ok(MarkOutcome::Logged(update)),
            Err(e) => {
                record.revoke(id);
                if let Err(rollback) = self.store.save_record(day, &record) {
                    tracing::warn!(
                        "Failed to roll back dose {} on {} after ledger error: {}",
                        id,
                        day,
                        rollback
                    );
                }
                Err(e)
            }
        }
    }

    pub fn progress(&self) -> Result<ProgressState> {
        self.store.load_progress()
    }

    /// The day's doses in regimen order with their logged status
    pub fn day_view(&self, day: CalendarDay) -> Result<DayView> {
        let record = self.store.load_record(day)?;
        let entries: Vec<DoseEntry> = self
            .regimen
            .obligations_for(day)
            .into_iter()
            .map(|obligation| DoseEntry {
                taken: record.is_completed(&obligation.id),
                obligation,
            })
            .collect();

        let done = entries.iter().filter(|e| e.taken).count();
        let status = DayStatus::from_counts(done, entries.len());

        Ok(DayView {
            day,
            entries,
            status,
        })
    }

    /// Clear every record and reset progress
    pub fn wipe(&mut self) -> Result<()> {
        self.store.wipe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::{build_default_regimen, Error};

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn tracker_store() -> CompletionStore<MemoryStore> {
        CompletionStore::new(MemoryStore::new(), build_default_regimen(day("2025-11-22")))
    }

    fn complete_all(store: &mut CompletionStore<MemoryStore>, d: CalendarDay) -> ProgressState {
        let mut last = None;
        for obligation in store.regimen().obligations_for(d) {
            if let MarkOutcome::Logged(update) = store.mark_completed(d, &obligation.id).unwrap() {
                last = Some(update.progress);
            }
        }
        last.unwrap()
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut store = tracker_store();
        let d = day("2025-11-22");
        let id = ObligationId::from("2025-11-22_prosentials_morning");

        let first = store.mark_completed(d, &id).unwrap();
        let second = store.mark_completed(d, &id).unwrap();

        assert!(matches!(first, MarkOutcome::Logged(_)));
        assert_eq!(second, MarkOutcome::AlreadyLogged);
        assert_eq!(store.progress().unwrap().total_points, 1);
        assert_eq!(store.completion_count(d).unwrap(), 1);
        assert!(store.is_completed(d, &id).unwrap());
    }

    #[test]
    fn test_streak_scenario() {
        let mut store = tracker_store();
        let d1 = day("2025-11-22");

        let progress = complete_all(&mut store, d1);
        assert!(progress.is_full_day(d1));
        assert_eq!(progress.current_streak, 1);

        let progress = complete_all(&mut store, d1.succ());
        assert_eq!(progress.current_streak, 2);

        // Skip d1+2
        let progress = complete_all(&mut store, d1.add_days(3));
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.last_full_day, Some(d1.add_days(3)));

        // Saturday 3, Sunday 2, Tuesday 3
        assert_eq!(progress.total_points, 8);
    }

    #[test]
    fn test_day_completes_only_on_last_dose() {
        let mut store = tracker_store();
        let d = day("2025-11-22");
        let obligations = store.regimen().obligations_for(d);
        assert_eq!(obligations.len(), 3);

        for (i, obligation) in obligations.iter().enumerate() {
            let outcome = store.mark_completed(d, &obligation.id).unwrap();
            let MarkOutcome::Logged(update) = outcome else {
                panic!("expected a new log");
            };
            assert_eq!(update.day_completed, i == obligations.len() - 1);
        }
    }

    #[test]
    fn test_stale_id_is_tolerated() {
        let mut store = tracker_store();
        let d = day("2025-11-24");

        let outcome = store
            .mark_completed(d, &ObligationId::from("2025-11-24_retired_evening"))
            .unwrap();
        let MarkOutcome::Logged(update) = outcome else {
            panic!("expected a new log");
        };
        assert!(!update.day_completed);
        assert_eq!(update.progress.total_points, 1);

        let view = store.day_view(d).unwrap();
        assert_eq!(view.status, DayStatus::NotStarted { total: 1 });
        assert_eq!(store.completion_count(d).unwrap(), 1);
    }

    #[test]
    fn test_record_write_failure_awards_nothing() {
        let mut store = tracker_store();
        let d = day("2025-11-22");
        let id = ObligationId::from("2025-11-22_prosentials_morning");

        store.store_mut().set_record_writes_fail(true);
        let result = store.mark_completed(d, &id);

        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!store.is_completed(d, &id).unwrap());
        assert_eq!(store.progress().unwrap(), ProgressState::default());
    }

    #[test]
    fn test_progress_write_failure_rolls_back_mark() {
        let mut store = tracker_store();
        let d = day("2025-11-22");
        let id = ObligationId::from("2025-11-22_prosentials_morning");

        store.store_mut().set_progress_writes_fail(true);
        assert!(store.mark_completed(d, &id).is_err());
        assert!(!store.is_completed(d, &id).unwrap());

        // Retrying once storage is back applies the action in full
        store.store_mut().set_progress_writes_fail(false);
        assert!(matches!(
            store.mark_completed(d, &id).unwrap(),
            MarkOutcome::Logged(_)
        ));
        assert_eq!(store.progress().unwrap().total_points, 1);
    }

    #[test]
    fn test_day_view_order_and_status() {
        let mut store = tracker_store();
        let d = day("2025-11-22");

        let view = store.day_view(d).unwrap();
        assert_eq!(view.status, DayStatus::NotStarted { total: 3 });
        assert!(view.entries.iter().all(|e| !e.taken));

        let second = view.entries[1].obligation.id.clone();
        store.mark_completed(d, &second).unwrap();

        let view = store.day_view(d).unwrap();
        assert_eq!(view.status, DayStatus::InProgress { done: 1, total: 3 });
        assert!(!view.entries[0].taken);
        assert!(view.entries[1].taken);
    }

    #[test]
    fn test_wipe_restores_initial_state() {
        let mut store = tracker_store();
        let d = day("2025-11-22");
        complete_all(&mut store, d);

        store.wipe().unwrap();

        assert_eq!(store.progress().unwrap(), ProgressState::default());
        assert_eq!(store.completion_count(d).unwrap(), 0);
        assert_eq!(
            store.day_view(d).unwrap().status,
            DayStatus::NotStarted { total: 3 }
        );
    }

    #[test]
    fn test_file_backed_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let regimen_start = day("2025-11-22");
        let d = day("2025-11-24");
        let id = ObligationId::from("2025-11-24_prosentials_morning");

        {
            let mut store = CompletionStore::new(
                FileStore::new(temp_dir.path()),
                build_default_regimen(regimen_start),
            );
            store.mark_completed(d, &id).unwrap();
        }

        let mut store = CompletionStore::new(
            FileStore::new(temp_dir.path()),
            build_default_regimen(regimen_start),
        );
        assert!(store.is_completed(d, &id).unwrap());
        assert_eq!(store.mark_completed(d, &id).unwrap(), MarkOutcome::AlreadyLogged);

        let progress = store.progress().unwrap();
        assert_eq!(progress.total_points, 1);
        assert_eq!(progress.current_streak, 1);
    }
}
