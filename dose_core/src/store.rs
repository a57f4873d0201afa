//! Persisted state behind the [`ProgressStore`] interface.
//!
//! The core never touches storage directly; it goes through a store that is
//! injected into the completion store and ledger. [`FileStore`] keeps JSON
//! files under a data directory, [`MemoryStore`] keeps everything in memory
//! and can simulate unavailable storage.

use crate::persist::{read_json_or_default, write_json_atomic};
use crate::{CalendarDay, CompletionRecord, Error, ProgressState, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory under the data dir that holds all tracker state
const STATE_DIR: &str = "state";

/// Where a wiped state directory is parked until it is deleted
const WIPE_DIR: &str = ".state.wiped";

const PROGRESS_FILE: &str = "progress.json";
const DAYS_DIR: &str = "days";

/// Storage for completion records and progress
///
/// Loads fail open: corrupt or unreadable data comes back as the empty
/// default. Only writes report storage errors.
pub trait ProgressStore {
    fn load_progress(&self) -> Result<ProgressState>;
    fn save_progress(&mut self, state: &ProgressState) -> Result<()>;

    fn load_record(&self, day: CalendarDay) -> Result<CompletionRecord>;
    fn save_record(&mut self, day: CalendarDay, record: &CompletionRecord) -> Result<()>;

    /// Remove every record and reset progress, all or nothing
    fn wipe(&mut self) -> Result<()>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON files under `<data_dir>/state/`
///
/// - `progress.json`: points, streak, last full day and full-day markers
/// - `days/<YYYY-MM-DD>.json`: obligation id → taken
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.join(STATE_DIR)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.state_dir().join(PROGRESS_FILE)
    }

    pub fn day_path(&self, day: CalendarDay) -> PathBuf {
        self.state_dir().join(DAYS_DIR).join(format!("{}.json", day))
    }

    fn write<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        write_json_atomic(path, value)
            .map_err(|e| Error::Storage(format!("writing {}: {}", path.display(), e)))
    }
}

impl ProgressStore for FileStore {
    fn load_progress(&self) -> Result<ProgressState> {
        Ok(read_json_or_default(&self.progress_path()))
    }

    fn save_progress(&mut self, state: &ProgressState) -> Result<()> {
        Self::write(&self.progress_path(), state)
    }

    fn load_record(&self, day: CalendarDay) -> Result<CompletionRecord> {
        Ok(read_json_or_default(&self.day_path(day)))
    }

    fn save_record(&mut self, day: CalendarDay, record: &CompletionRecord) -> Result<()> {
        Self::write(&self.day_path(day), record)
    }

    fn wipe(&mut self) -> Result<()> {
        let state_dir = self.state_dir();
        let parked = self.data_dir.join(WIPE_DIR);

        // Leftover from an interrupted wipe
        if parked.exists() {
            std::fs::remove_dir_all(&parked)?;
        }

        if !state_dir.exists() {
            tracing::debug!("No state at {:?}, nothing to wipe", state_dir);
            return Ok(());
        }

        // The rename is the commit point: afterwards every load sees empty state
        std::fs::rename(&state_dir, &parked)
            .map_err(|e| Error::Storage(format!("wiping {}: {}", state_dir.display(), e)))?;

        if let Err(e) = std::fs::remove_dir_all(&parked) {
            tracing::warn!("Wiped state but failed to delete {:?}: {}", parked, e);
        }

        tracing::info!("Wiped all tracker state under {:?}", self.data_dir);
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: ProgressState,
    records: HashMap<CalendarDay, CompletionRecord>,
    fail_record_writes: bool,
    fail_progress_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every completion-record write fail
    pub fn set_record_writes_fail(&mut self, fail: bool) {
        self.fail_record_writes = fail;
    }

    /// Make every progress write fail
    pub fn set_progress_writes_fail(&mut self, fail: bool) {
        self.fail_progress_writes = fail;
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> Result<ProgressState> {
        Ok(self.progress.clone())
    }

    fn save_progress(&mut self, state: &ProgressState) -> Result<()> {
        if self.fail_progress_writes {
            return Err(Error::Storage("progress writes disabled".into()));
        }
        self.progress = state.clone();
        Ok(())
    }

    fn load_record(&self, day: CalendarDay) -> Result<CompletionRecord> {
        Ok(self.records.get(&day).cloned().unwrap_or_default())
    }

    fn save_record(&mut self, day: CalendarDay, record: &CompletionRecord) -> Result<()> {
        if self.fail_record_writes {
            return Err(Error::Storage("record writes disabled".into()));
        }
        self.records.insert(day, record.clone());
        Ok(())
    }

    fn wipe(&mut self) -> Result<()> {
        if self.fail_record_writes || self.fail_progress_writes {
            return Err(Error::Storage("writes disabled".into()));
        }
        self.records.clear();
        self.progress = ProgressState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObligationId;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn record_with(id: &str) -> CompletionRecord {
        let mut record = CompletionRecord::default();
        record.mark(ObligationId::from(id));
        record
    }

    #[test]
    fn test_file_store_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        let d = day("2025-11-22");

        store
            .save_record(d, &record_with("2025-11-22_prosentials_morning"))
            .unwrap();
        store.save_progress(&ProgressState::default()).unwrap();

        assert!(temp_dir
            .path()
            .join("state/days/2025-11-22.json")
            .exists());
        assert!(temp_dir.path().join("state/progress.json").exists());

        let raw = std::fs::read_to_string(store.day_path(d)).unwrap();
        assert_eq!(raw, r#"{"2025-11-22_prosentials_morning":true}"#);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        let d = day("2025-11-22");

        let mut progress = ProgressState {
            total_points: 7,
            current_streak: 2,
            last_full_day: Some(d),
            ..Default::default()
        };
        progress.full_days.insert(d);
        store.save_progress(&progress).unwrap();
        store.save_record(d, &record_with("x_y_morning")).unwrap();

        // A fresh store over the same directory sees the same state
        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.load_progress().unwrap(), progress);
        assert!(reopened
            .load_record(d)
            .unwrap()
            .is_completed(&ObligationId::from("x_y_morning")));
        assert!(reopened.load_record(d.succ()).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_corrupt_day_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let d = day("2025-11-22");

        std::fs::create_dir_all(store.day_path(d).parent().unwrap()).unwrap();
        std::fs::write(store.day_path(d), "[1, 2,").unwrap();

        assert!(store.load_record(d).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_wipe() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        let d = day("2025-11-22");

        store.save_record(d, &record_with("x_y_morning")).unwrap();
        store
            .save_progress(&ProgressState {
                total_points: 1,
                ..Default::default()
            })
            .unwrap();

        store.wipe().unwrap();

        assert!(!store.state_dir().exists());
        assert!(!temp_dir.path().join(WIPE_DIR).exists());
        assert_eq!(store.load_progress().unwrap(), ProgressState::default());
        assert!(store.load_record(d).unwrap().is_empty());

        // Wiping empty state is fine
        store.wipe().unwrap();
    }

    #[test]
    fn test_file_store_write_failure_is_storage_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "").unwrap();

        let mut store = FileStore::new(&blocker);
        let result = store.save_progress(&ProgressState::default());

        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_memory_store_failure_switches() {
        let mut store = MemoryStore::new();
        let d = day("2025-11-22");

        store.set_record_writes_fail(true);
        assert!(store.save_record(d, &record_with("a_b_morning")).is_err());
        assert!(store.load_record(d).unwrap().is_empty());

        store.set_record_writes_fail(false);
        store.set_progress_writes_fail(true);
        assert!(store.save_record(d, &record_with("a_b_morning")).is_ok());
        assert!(store.save_progress(&ProgressState::default()).is_err());
        assert!(store.wipe().is_err());
    }
}
