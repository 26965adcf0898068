//! The host progress record.
//!
//! The page stores one JSON object per device. The puzzle owns five of its
//! keys; everything else (acceptance date, current phase, ...) belongs to
//! other parts of the card and must survive every puzzle write.

use serde_json::{Map, Value};

use constellation_engine::domain::PuzzleProgress;

use crate::snapshot_codec::SnapshotError;

pub type HostRecord = Map<String, Value>;

/// Puzzle keys as `(current name, name written by older builds)`.
pub const PUZZLE_KEYS: [(&str, Option<&str>); 5] = [
    ("solvingOrder", None),
    ("solvedCount", None),
    ("completedIds", Some("constellationsCompleted")),
    ("noteTriggerIds", Some("noteIndices")),
    ("viewedNoteIds", Some("viewedNotes")),
];

/// Parse a stored record. Anything but a JSON object is an error.
pub fn parse_record(json: &str) -> Result<HostRecord, SnapshotError> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SnapshotError::Deserialization(format!(
            "expected a JSON object, found {}",
            kind_of(&other)
        ))),
        Err(err) => Err(SnapshotError::Deserialization(err.to_string())),
    }
}

/// Copy the puzzle keys out of a host record under their current names.
///
/// Returns `None` when the record holds no puzzle keys at all, which is the
/// normal state before the puzzle is first reached.
pub fn extract_puzzle_fields(record: &HostRecord) -> Option<Value> {
    let mut fields = Map::new();
    for (name, legacy) in PUZZLE_KEYS {
        let value = record
            .get(name)
            .or_else(|| legacy.and_then(|old| record.get(old)));
        if let Some(value) = value {
            fields.insert(name.to_string(), value.clone());
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(Value::Object(fields))
    }
}

/// Write `progress` into `record`, dropping any legacy spellings of the same
/// keys. Unrelated keys are left as they are.
pub fn merge_progress(
    record: &mut HostRecord,
    progress: &PuzzleProgress,
) -> Result<(), SnapshotError> {
    let Value::Object(fields) = serde_json::to_value(progress)
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?
    else {
        return Err(SnapshotError::Serialization(
            "progress did not serialize to an object".to_string(),
        ));
    };
    for (_, legacy) in PUZZLE_KEYS {
        if let Some(old) = legacy {
            record.remove(old);
        }
    }
    for (key, value) in fields {
        record.insert(key, value);
    }
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
