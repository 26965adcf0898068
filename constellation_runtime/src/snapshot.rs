//! Backup files: progress plus integrity hash.
//!
//! A backup carries the layout version, the progress record and the
//! canonical hash of that record. Import refuses a file whose hash does not
//! match its content, or whose progress breaks an invariant.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use constellation_engine::domain::PuzzleProgress;
use constellation_engine::hashing::canonical_hash;
use constellation_engine::invariants::try_validate_invariants;
use constellation_engine::PROGRESS_FORMAT_VERSION;

use crate::snapshot_codec::SnapshotError;

/// Backup on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Backup {
    pub format_version: u32,
    pub progress: PuzzleProgress,
    /// `canonical_hash` of `progress`.
    pub hash: String,
}

impl Backup {
    pub fn new(progress: &PuzzleProgress) -> Self {
        Self {
            format_version: PROGRESS_FORMAT_VERSION,
            progress: progress.clone(),
            hash: canonical_hash(progress),
        }
    }
}

/// True if the stored hash matches the progress it travels with.
pub fn verify_backup_hash(backup: &Backup) -> bool {
    canonical_hash(&backup.progress) == backup.hash
}

pub fn export_backup(progress: &PuzzleProgress, path: &Path) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(&Backup::new(progress))
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Read, verify and validate a backup file.
pub fn import_backup(path: &Path) -> Result<PuzzleProgress, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let backup: Backup = serde_json::from_str(&content)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;

    if backup.format_version != PROGRESS_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(backup.format_version));
    }
    if !verify_backup_hash(&backup) {
        return Err(SnapshotError::HashMismatch {
            expected: backup.hash,
            actual: canonical_hash(&backup.progress),
        });
    }
    try_validate_invariants(&backup.progress)?;
    Ok(backup.progress)
}
