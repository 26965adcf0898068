//! Snapshot Codec: progress encoder/decoder and store access.
//!
//! - `encode_progress`:  PuzzleProgress → JSON string
//! - `decode_progress`:  JSON string → PuzzleProgress (strict, no defaults)
//! - `restore_progress`: decode + invariant validation
//! - `load_progress` / `save_progress`: read and read-modify-write of the
//!   host record in a `ProgressStore`

use std::io;

use serde_json::Value;
use thiserror::Error;

use constellation_engine::domain::PuzzleProgress;
use constellation_engine::invariants::{try_validate_invariants, InvariantViolation};

use crate::record::{extract_puzzle_fields, merge_progress, parse_record, HostRecord};
use crate::store::{ProgressStore, StoreError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("SerializationError: {0}")]
    Serialization(String),
    /// Malformed JSON, a missing field or an unknown field.
    #[error("DeserializationError: {0}")]
    Deserialization(String),
    #[error("InvariantViolation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
    #[error("HashMismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("UnsupportedVersion: {0}")]
    UnsupportedVersion(u32),
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

pub fn encode_progress(progress: &PuzzleProgress) -> Result<String, SnapshotError> {
    serde_json::to_string(progress).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

/// Strict decode: every field required, unknown fields rejected. No
/// invariant validation; use `restore_progress` for untrusted input.
pub fn decode_progress(json: &str) -> Result<PuzzleProgress, SnapshotError> {
    serde_json::from_str(json).map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

pub fn restore_progress(json: &str) -> Result<PuzzleProgress, SnapshotError> {
    let progress = decode_progress(json)?;
    try_validate_invariants(&progress)?;
    Ok(progress)
}

/// Decode and validate the puzzle fields of a host record.
/// `Ok(None)` if the record has no puzzle fields yet.
pub fn progress_from_record(record: &HostRecord) -> Result<Option<PuzzleProgress>, SnapshotError> {
    let Some(fields) = extract_puzzle_fields(record) else {
        return Ok(None);
    };
    let progress = progress_from_value(fields)?;
    try_validate_invariants(&progress)?;
    Ok(Some(progress))
}

fn progress_from_value(value: Value) -> Result<PuzzleProgress, SnapshotError> {
    serde_json::from_value(value).map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Store access
// ---------------------------------------------------------------------------

/// Load validated progress from the record stored under `key`.
pub fn load_progress<S: ProgressStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<PuzzleProgress>, SnapshotError> {
    match store.load(key)? {
        Some(json) => progress_from_record(&parse_record(&json)?),
        None => Ok(None),
    }
}

/// Merge `progress` into the record under `key`, keeping its other fields.
/// An unreadable record is replaced rather than blocking the write.
pub fn save_progress<S: ProgressStore + ?Sized>(
    store: &mut S,
    key: &str,
    progress: &PuzzleProgress,
) -> Result<(), SnapshotError> {
    let mut record = match store.load(key) {
        Ok(Some(json)) => parse_record(&json).unwrap_or_else(|err| {
            log::warn!("replacing unreadable progress record: {err}");
            HostRecord::new()
        }),
        Ok(None) => HostRecord::new(),
        // bytes that are not UTF-8 cannot be a record either
        Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
            log::warn!("replacing unreadable progress record: {err}");
            HostRecord::new()
        }
        Err(err) => return Err(err.into()),
    };
    merge_progress(&mut record, progress)?;
    let json = serde_json::to_string(&record)
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
    store.save(key, &json)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
