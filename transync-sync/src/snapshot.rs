//! Snapshot store — persisted content hashes from the last successful exchange.
//!
//! A snapshot is a flat JSON object mapping repository-relative paths to hex
//! digests, stored at `<checksum_folder>/<branch>_<repo>[_<suffix>].json`.
//! Writes use the same atomic `.tmp` + rename pattern as the rest of the
//! workspace; keys are written sorted so snapshots diff cleanly.
//!
//! Reads never fail: a missing snapshot is the normal first-run state and a
//! corrupt one is treated the same way.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Relative path → hex digest. `BTreeMap` keeps keys sorted on write.
pub type HashSnapshot = BTreeMap<String, String>;

/// Identifies one snapshot file inside a checksum folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKey {
    pub branch: String,
    pub repo: String,
    pub suffix: Option<String>,
}

impl SnapshotKey {
    pub fn new(branch: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            repo: repo.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    /// `<branch>_<repo>[_<suffix>].json`
    pub fn file_name(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}_{}_{}.json", self.branch, self.repo, suffix),
            None => format!("{}_{}.json", self.branch, self.repo),
        }
    }
}

/// Path to the snapshot for `key` inside `folder`.
pub fn store_path_at(folder: &Path, key: &SnapshotKey) -> PathBuf {
    folder.join(key.file_name())
}

/// Load the snapshot for `key`.
///
/// Returns an empty snapshot if the file is missing, unreadable or not a flat
/// string-to-string JSON object.
pub fn load_at(folder: &Path, key: &SnapshotKey) -> HashSnapshot {
    let path = store_path_at(folder, key);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("no snapshot at {}", path.display());
            return HashSnapshot::new();
        }
        Err(err) => {
            tracing::warn!("cannot read snapshot {}: {err}", path.display());
            return HashSnapshot::new();
        }
    };
    match serde_json::from_str::<HashSnapshot>(&contents) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!("ignoring corrupt snapshot {}: {err}", path.display());
            HashSnapshot::new()
        }
    }
}

/// Overwrite the snapshot for `key` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(folder: &Path, key: &SnapshotKey, snapshot: &HashSnapshot) -> Result<(), SyncError> {
    let path = store_path_at(folder, key);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid snapshot path")));
    };
    // Branch names such as `release/1.4` add a directory level.
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    tracing::info!("wrote snapshot: {} ({} files)", path.display(), snapshot.len());
    Ok(())
}
