/// Constellation puzzle: Invariant Checks
///
/// `try_validate_invariants` is the gate every persisted snapshot passes
/// before the engine trusts it. `validate_invariants` is the hard-fail form
/// the engine runs after each transition in debug builds.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::catalog::{Constellation, CONSTELLATION_COUNT};
use crate::domain::{Board, ConstellationId, PuzzleProgress};
use crate::graph::{contains_edge, find_duplicate_edge, Edge};
use crate::notes::NOTE_COUNT;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("[INVARIANT:solved_count] solved count {0} is past the last constellation")]
    SolvedCountOutOfRange(usize),
    #[error("[INVARIANT:solving_order] solving order {0:?} is not a permutation of 0..12")]
    SolvingOrderNotPermutation(Vec<ConstellationId>),
    #[error("[INVARIANT:known_id] {field} references unknown constellation {id}")]
    UnknownConstellation { field: &'static str, id: ConstellationId },
    #[error("[INVARIANT:unique] {field} lists constellation {id} twice")]
    Duplicate { field: &'static str, id: ConstellationId },
    #[error("[INVARIANT:completed_reached] constellation {0} is completed but was never reached")]
    CompletedNotReached(ConstellationId),
    #[error("[INVARIANT:advanced_completed] constellation {0} was advanced past without being completed")]
    AdvancedNotCompleted(ConstellationId),
    #[error("[INVARIANT:pending_note] constellation {0} is completed but not advanced, and its note was never shown")]
    PendingWithoutNote(ConstellationId),
    #[error("[INVARIANT:note_count] expected 7 note triggers, found {0}")]
    NoteTriggerCount(usize),
    #[error("[INVARIANT:viewed_subset] viewed note {0} is not a note trigger")]
    ViewedNotTrigger(ConstellationId),
    #[error("[INVARIANT:board_edge] drawn edge {0:?} is not part of the pattern")]
    DrawnEdgeNotRequired(Edge),
    #[error("[INVARIANT:board_unique] edge {0:?} is drawn twice")]
    DuplicateDrawnEdge(Edge),
    #[error("[INVARIANT:board_stars] connected stars disagree with drawn edges")]
    ConnectedStarsOutOfSync,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every progress check. Returns the first failure.
pub fn try_validate_invariants(progress: &PuzzleProgress) -> Result<(), InvariantViolation> {
    check_solved_count(progress)?;
    check_solving_order(progress)?;
    check_id_list("completedIds", &progress.completed_ids)?;
    check_id_list("noteTriggerIds", &progress.note_trigger_ids)?;
    check_id_list("viewedNoteIds", &progress.viewed_note_ids)?;
    check_completed_reached(progress)?;
    check_advanced_completed(progress)?;
    check_pending_note(progress)?;
    check_note_triggers(progress)?;
    Ok(())
}

/// Hard-fail variant of `try_validate_invariants`.
pub fn validate_invariants(progress: &PuzzleProgress) {
    if let Err(violation) = try_validate_invariants(progress) {
        panic!("Invariant violation: {violation}");
    }
}

/// Drawn edges must be a duplicate-free subset of the pattern.
pub fn try_validate_board(
    constellation: &Constellation,
    board: &Board,
) -> Result<(), InvariantViolation> {
    for &edge in board.drawn() {
        if !contains_edge(constellation.connections, edge) {
            return Err(InvariantViolation::DrawnEdgeNotRequired(edge));
        }
    }
    if let Some(edge) = find_duplicate_edge(board.drawn()) {
        return Err(InvariantViolation::DuplicateDrawnEdge(edge));
    }
    if !board.is_consistent() {
        return Err(InvariantViolation::ConnectedStarsOutOfSync);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_solved_count(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    if p.solved_count > CONSTELLATION_COUNT {
        return Err(InvariantViolation::SolvedCountOutOfRange(p.solved_count));
    }
    Ok(())
}

fn check_solving_order(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    let distinct: BTreeSet<ConstellationId> = p.solving_order.iter().copied().collect();
    let is_permutation = p.solving_order.len() == CONSTELLATION_COUNT
        && distinct.len() == CONSTELLATION_COUNT
        && distinct.iter().all(|&id| id < CONSTELLATION_COUNT);
    if !is_permutation {
        return Err(InvariantViolation::SolvingOrderNotPermutation(
            p.solving_order.clone(),
        ));
    }
    Ok(())
}

fn check_id_list(field: &'static str, ids: &[ConstellationId]) -> Result<(), InvariantViolation> {
    let mut seen = BTreeSet::new();
    for &id in ids {
        if id >= CONSTELLATION_COUNT {
            return Err(InvariantViolation::UnknownConstellation { field, id });
        }
        if !seen.insert(id) {
            return Err(InvariantViolation::Duplicate { field, id });
        }
    }
    Ok(())
}

/// Completed ids come from the advanced prefix plus, at most, the puzzle
/// under the cursor (completed while its note is open).
fn check_completed_reached(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    let reach = (p.solved_count + 1).min(CONSTELLATION_COUNT);
    let reached = &p.solving_order[..reach];
    for &id in &p.completed_ids {
        if !reached.contains(&id) {
            return Err(InvariantViolation::CompletedNotReached(id));
        }
    }
    Ok(())
}

fn check_advanced_completed(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    for &id in &p.solving_order[..p.solved_count] {
        if !p.completed_ids.contains(&id) {
            return Err(InvariantViolation::AdvancedNotCompleted(id));
        }
    }
    Ok(())
}

/// A puzzle is only persisted as completed-but-not-advanced on the note path,
/// where the viewed bit is committed in the same snapshot.
fn check_pending_note(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    if p.solved_count >= CONSTELLATION_COUNT {
        return Ok(());
    }
    let in_flight = p.solving_order[p.solved_count];
    if p.completed_ids.contains(&in_flight) && !p.viewed_note_ids.contains(&in_flight) {
        return Err(InvariantViolation::PendingWithoutNote(in_flight));
    }
    Ok(())
}

fn check_note_triggers(p: &PuzzleProgress) -> Result<(), InvariantViolation> {
    if p.note_trigger_ids.len() != NOTE_COUNT {
        return Err(InvariantViolation::NoteTriggerCount(p.note_trigger_ids.len()));
    }
    for &id in &p.viewed_note_ids {
        if !p.note_trigger_ids.contains(&id) {
            return Err(InvariantViolation::ViewedNotTrigger(id));
        }
    }
    Ok(())
}
