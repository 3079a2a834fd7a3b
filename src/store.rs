//! # Last-Location Persistence
//!
//! A single-slot store for the location the user last picked, kept as a small
//! JSON file. Loaded once at startup, overwritten on every new selection; the
//! last writer wins.

use crate::Location;
use log::debug;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Slot file could not be read or written
    #[error("location store IO: {0}")]
    Io(#[from] io::Error),

    /// Slot file exists but does not hold a location
    #[error("location store corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// File-backed single-slot location store.
#[derive(Clone, Debug)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocationStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored location, or `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Location>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let location = serde_json::from_slice(&data)?;
        Ok(Some(location))
    }

    /// Replace the stored location.
    pub fn save(&self, location: &Location) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(location)?;
        fs::write(&self.path, data)?;
        debug!("Saved location {} to {}", location.name, self.path.display());
        Ok(())
    }

    /// Empty the slot. Clearing an empty slot is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
