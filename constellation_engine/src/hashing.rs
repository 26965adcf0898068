/// Constellation puzzle: Canonical Hashing
///
/// Deterministic serialization + SHA-256 of a progress record.
///
/// Rules:
///   - format_version first, then the five progress fields in fixed order
///   - solvingOrder and noteTriggerIds keep their order (it carries meaning)
///   - completedIds and viewedNoteIds are sorted (they are sets)
///   - UTF-8 JSON, no whitespace

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{ConstellationId, PuzzleProgress};
use crate::PROGRESS_FORMAT_VERSION;

/// Canonical serialization of a progress record to UTF-8 JSON bytes.
pub fn canonical_serialize(progress: &PuzzleProgress) -> Vec<u8> {
    build_canonical_value(progress).to_string().into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(progress: &PuzzleProgress) -> String {
    let digest = Sha256::digest(canonical_serialize(progress));
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn build_canonical_value(progress: &PuzzleProgress) -> Value {
    let mut root = Map::new();
    root.insert(
        "format_version".to_string(),
        Value::from(PROGRESS_FORMAT_VERSION),
    );
    root.insert(
        "solvingOrder".to_string(),
        id_array(progress.solving_order.iter().copied()),
    );
    root.insert(
        "solvedCount".to_string(),
        Value::from(progress.solved_count),
    );
    root.insert(
        "completedIds".to_string(),
        sorted_id_array(&progress.completed_ids),
    );
    root.insert(
        "noteTriggerIds".to_string(),
        id_array(progress.note_trigger_ids.iter().copied()),
    );
    root.insert(
        "viewedNoteIds".to_string(),
        sorted_id_array(&progress.viewed_note_ids),
    );
    Value::Object(root)
}

fn id_array(ids: impl Iterator<Item = ConstellationId>) -> Value {
    Value::Array(ids.map(Value::from).collect())
}

fn sorted_id_array(ids: &[ConstellationId]) -> Value {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    id_array(sorted.into_iter())
}
