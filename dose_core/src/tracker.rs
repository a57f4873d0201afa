//! Command handlers for the presentation layer.
//!
//! A front end only needs a [`Tracker`]: it reads day views and progress
//! snapshots, and turns user actions into `on_dose_logged` /
//! `on_reset_requested` commands.

use crate::completion::{CompletionStore, MarkOutcome};
use crate::store::{FileStore, ProgressStore};
use crate::{
    CalendarDay, Config, DayView, Error, Obligation, ProgressState, RegimenRuleSet, Result,
};
use std::path::PathBuf;

/// A dose the user asked to log, with what happened to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoseLogged {
    pub obligation: Obligation,
    pub outcome: MarkOutcome,
}

pub struct Tracker<S: ProgressStore> {
    completions: CompletionStore<S>,
}

impl Tracker<FileStore> {
    /// File-backed tracker under `data_dir` using the configured regimen
    pub fn open(data_dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(FileStore::new(data_dir), config.build_regimen())
    }
}

impl<S: ProgressStore> Tracker<S> {
    pub fn new(store: S, regimen: RegimenRuleSet) -> Self {
        Self {
            completions: CompletionStore::new(store, regimen),
        }
    }

    pub fn completions(&self) -> &CompletionStore<S> {
        &self.completions
    }

    pub fn day_view(&self, day: CalendarDay) -> Result<DayView> {
        self.completions.day_view(day)
    }

    pub fn progress(&self) -> Result<ProgressState> {
        self.completions.progress()
    }

    /// Find a dose due on `day` by 1-based list number or exact id
    pub fn resolve_dose(&self, day: CalendarDay, reference: &str) -> Result<Obligation> {
        let reference = reference.trim();
        let mut obligations = self.completions.regimen().obligations_for(day);

        if let Ok(number) = reference.parse::<usize>() {
            if (1..=obligations.len()).contains(&number) {
                return Ok(obligations.swap_remove(number - 1));
            }
        }

        obligations
            .into_iter()
            .find(|o| o.id.as_str() == reference)
            .ok_or_else(|| {
                Error::UnknownDose(format!("{:?} is not due on {}", reference, day))
            })
    }

    /// Log one dose due on `day`
    pub fn on_dose_logged(&mut self, day: CalendarDay, reference: &str) -> Result<DoseLogged> {
        let obligation = self.resolve_dose(day, reference)?;
        let outcome = self.completions.mark_completed(day, &obligation.id)?;
        Ok(DoseLogged {
            obligation,
            outcome,
        })
    }

    /// Log every dose still outstanding on `day`, in list order
    pub fn on_all_doses_logged(&mut self, day: CalendarDay) -> Result<Vec<DoseLogged>> {
        let outstanding: Vec<Obligation> = self
            .day_view(day)?
            .entries
            .into_iter()
            .filter(|entry| !entry.taken)
            .map(|entry| entry.obligation)
            .collect();

        let mut logged = Vec::with_capacity(outstanding.len());
        for obligation in outstanding {
            let outcome = self.completions.mark_completed(day, &obligation.id)?;
            logged.push(DoseLogged {
                obligation,
                outcome,
            });
        }
        Ok(logged)
    }

    /// Wipe every record and reset progress; irreversible
    pub fn on_reset_requested(&mut self) -> Result<()> {
        self.completions.wipe()?;
        tracing::info!("Progress reset requested and applied");
        Ok(())
    }
}
