/// Constellation puzzle: Transition Logic
///
/// The rules behind every state change. Functions here mutate the progress
/// record or inspect the board; sequencing and phase bookkeeping are done by
/// the engine.

use crate::catalog::{Constellation, CONSTELLATION_COUNT};
use crate::domain::{ConstellationId, PuzzleProgress};
use crate::graph::{contains_edge, Edge};

/// Why a connection attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Both ends on the same star. Treated as a cancelled drag.
    SelfLoop,
    /// One of the indices is not a star of this constellation.
    UnknownStar,
    /// The pair is not part of the pattern.
    NotInPattern,
    /// The line is already on the board.
    AlreadyDrawn,
}

impl Rejection {
    /// Whether the refusal deserves the "wrong" cue. Re-drawing an existing
    /// line or tapping a single star stays silent.
    pub fn is_audible(self) -> bool {
        matches!(self, Rejection::UnknownStar | Rejection::NotInPattern)
    }
}

// ---------------------------------------------------------------------------
// Connection validation
// ---------------------------------------------------------------------------

/// Decide whether `edge` may be added to `drawn` on `constellation`.
pub fn check_connection(
    constellation: &Constellation,
    drawn: &[Edge],
    edge: Edge,
) -> Result<(), Rejection> {
    if edge.is_loop() {
        return Err(Rejection::SelfLoop);
    }
    if edge.max_index() >= constellation.star_count() {
        return Err(Rejection::UnknownStar);
    }
    if !contains_edge(constellation.connections, edge) {
        return Err(Rejection::NotInPattern);
    }
    if contains_edge(drawn, edge) {
        return Err(Rejection::AlreadyDrawn);
    }
    Ok(())
}

/// Count equality is enough: only required, non-duplicate edges ever reach
/// the board, so equal counts mean equal sets.
pub fn is_puzzle_complete(constellation: &Constellation, drawn: &[Edge]) -> bool {
    drawn.len() == constellation.connections.len()
}

// ---------------------------------------------------------------------------
// Progress mutation
// ---------------------------------------------------------------------------

/// Mark `id` completed. Idempotent; returns `true` if it was newly added.
pub fn record_completion(progress: &mut PuzzleProgress, id: ConstellationId) -> bool {
    if progress.completed_ids.contains(&id) {
        return false;
    }
    progress.completed_ids.push(id);
    true
}

/// True if solving `id` should open its note now.
pub fn should_unlock_note(progress: &PuzzleProgress, id: ConstellationId) -> bool {
    progress.note_trigger_ids.contains(&id) && !progress.viewed_note_ids.contains(&id)
}

/// Commit the "viewed" bit for `id` before the cursor moves, so a reload
/// while the note is open does not show it again.
pub fn mark_note_viewed(progress: &mut PuzzleProgress, id: ConstellationId) {
    if !progress.viewed_note_ids.contains(&id) {
        progress.viewed_note_ids.push(id);
    }
}

/// Move the cursor one step. Returns `true` once all twelve are solved.
pub fn advance(progress: &mut PuzzleProgress) -> bool {
    progress.solved_count = (progress.solved_count + 1).min(CONSTELLATION_COUNT);
    progress.solved_count == CONSTELLATION_COUNT
}

/// Constellation under the cursor, if the finale has not been reached.
pub fn current_id(progress: &PuzzleProgress) -> Option<ConstellationId> {
    if progress.solved_count < CONSTELLATION_COUNT {
        progress.solving_order.get(progress.solved_count).copied()
    } else {
        None
    }
}
