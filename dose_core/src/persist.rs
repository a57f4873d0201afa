//! Locked, atomic JSON file helpers.
//!
//! Reads take a shared lock and fail open: a missing, unreadable or
//! unparseable file yields the type's default value. Writes go through a
//! temp file in the target directory that is fsynced and renamed over the
//! original, so readers never observe a half-written file.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Load a JSON value, substituting the default when the file is missing or corrupt
pub fn read_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::debug!("No file at {:?}, using default", path);
        return T::default();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Using defaults.", path, e);
            return T::default();
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Using defaults.", path, e);
        return T::default();
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read = reader.read_to_string(&mut contents);
    let _ = file.unlock();

    if let Err(e) = read {
        tracing::warn!("Failed to read {:?}: {}. Using defaults.", path, e);
        return T::default();
    }

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded {:?}", path);
            value
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
            T::default()
        }
    }
}

/// Atomically replace `path` with the JSON encoding of `value`
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Storage(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;

    // Exclusive lock on the temp file serializes concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {:?}", path);
    Ok(())
}
