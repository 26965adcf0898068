/// Constellation puzzle: Engine
///
/// Top-level orchestrator. Owns the progress record, the explicit phase, the
/// board for the puzzle on screen and the RNG. Delegates the rules to
/// `transitions` and re-checks `invariants` after every change in debug
/// builds.

use std::collections::BTreeSet;

use glam::Vec2;
use log::{debug, info, warn};
use rand_chacha::ChaCha12Rng;

use crate::catalog::{self, Constellation, CONSTELLATION_COUNT};
use crate::domain::{
    Board, ConstellationId, Effect, EngineConstants, Outcome, Phase, PuzzleProgress, StarIndex,
    TransitionResult,
};
use crate::events::PuzzleInput;
use crate::graph::Edge;
use crate::guide::{generate_guide, Guide};
use crate::invariants::{try_validate_invariants, InvariantViolation};
use crate::notes::note_for;
use crate::state::{create_initial_progress, entropy_rng, seeded_rng};
use crate::transitions;

/// Placeholder shown in the reveal phrase for unsolved constellations.
pub const BLANK: &str = "_";

/// How the engine came to hold its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No snapshot was offered; a new play-through started.
    Fresh,
    /// The snapshot was valid and is now live.
    Resumed,
    /// The snapshot failed validation and was replaced by a new play-through.
    Discarded(InvariantViolation),
}

/// Stateful puzzle engine.
pub struct PuzzleEngine {
    progress: PuzzleProgress,
    phase: Phase,
    board: Board,
    guide: Option<Guide>,
    constants: EngineConstants,
    rng: ChaCha12Rng,
}

impl PuzzleEngine {
    /// Start a new play-through with OS-seeded randomness.
    pub fn new(constants: EngineConstants) -> Self {
        Self::fresh(constants, entropy_rng())
    }

    /// Start a new play-through with reproducible randomness.
    pub fn with_seed(seed: &str, constants: EngineConstants) -> Self {
        Self::fresh(constants, seeded_rng(seed))
    }

    /// Resume from a persisted snapshot, or start fresh when there is none or
    /// it is malformed. Never fails.
    pub fn resume(
        snapshot: Option<PuzzleProgress>,
        constants: EngineConstants,
    ) -> (Self, ResumeOutcome) {
        Self::resume_with_rng(snapshot, constants, entropy_rng())
    }

    /// `resume` with reproducible randomness for the guide and any fresh start.
    pub fn resume_with_seed(
        snapshot: Option<PuzzleProgress>,
        seed: &str,
        constants: EngineConstants,
    ) -> (Self, ResumeOutcome) {
        Self::resume_with_rng(snapshot, constants, seeded_rng(seed))
    }

    /// Strict resume: reject a malformed snapshot instead of replacing it.
    pub fn try_resume(
        snapshot: PuzzleProgress,
        constants: EngineConstants,
    ) -> Result<Self, InvariantViolation> {
        try_validate_invariants(&snapshot)?;
        Ok(Self::assemble(snapshot, constants, entropy_rng()))
    }

    fn resume_with_rng(
        snapshot: Option<PuzzleProgress>,
        constants: EngineConstants,
        rng: ChaCha12Rng,
    ) -> (Self, ResumeOutcome) {
        let Some(snapshot) = snapshot else {
            return (Self::fresh(constants, rng), ResumeOutcome::Fresh);
        };
        match try_validate_invariants(&snapshot) {
            Ok(()) => {
                info!(
                    "resuming play-through at {}/{} solved",
                    snapshot.solved_count, CONSTELLATION_COUNT
                );
                (Self::assemble(snapshot, constants, rng), ResumeOutcome::Resumed)
            }
            Err(violation) => {
                warn!("discarding saved progress: {violation}");
                (
                    Self::fresh(constants, rng),
                    ResumeOutcome::Discarded(violation),
                )
            }
        }
    }

    fn fresh(constants: EngineConstants, mut rng: ChaCha12Rng) -> Self {
        let progress = create_initial_progress(&mut rng);
        info!("new play-through, solving order {:?}", progress.solving_order);
        Self::assemble(progress, constants, rng)
    }

    /// Build an engine around progress that has already passed validation.
    fn assemble(progress: PuzzleProgress, constants: EngineConstants, rng: ChaCha12Rng) -> Self {
        let phase = if progress.solved_count >= CONSTELLATION_COUNT {
            Phase::Finale
        } else {
            Phase::InProgress {
                index: progress.solved_count,
            }
        };
        let mut engine = Self {
            progress,
            phase,
            board: Board::default(),
            guide: None,
            constants,
            rng,
        };
        engine.refresh_guide();
        engine
    }

    // ── Input ──────────────────────────────────────────────────────

    /// Apply a single input event.
    pub fn apply(&mut self, input: PuzzleInput) -> TransitionResult {
        debug!("apply {} in {:?}", input.name(), self.phase);
        let result = match input {
            PuzzleInput::Connect { from, to } => self.handle_connect(from, to),
            PuzzleInput::DismissNote => self.handle_dismiss_note(),
            PuzzleInput::Reset => self.handle_reset(),
        };
        #[cfg(debug_assertions)]
        self.assert_invariants();
        result
    }

    /// Try to draw the line `from`–`to` on the constellation on screen.
    pub fn connect(&mut self, from: StarIndex, to: StarIndex) -> TransitionResult {
        self.apply(PuzzleInput::Connect { from, to })
    }

    /// Close the open note and move to the next constellation.
    pub fn dismiss_note(&mut self) -> TransitionResult {
        self.apply(PuzzleInput::DismissNote)
    }

    /// Throw away the play-through and start a new one.
    pub fn reset(&mut self) -> TransitionResult {
        self.apply(PuzzleInput::Reset)
    }

    fn handle_connect(&mut self, from: StarIndex, to: StarIndex) -> TransitionResult {
        let Phase::InProgress { index } = self.phase else {
            debug!("connect {from}-{to} ignored in {:?}", self.phase);
            return TransitionResult::ignored();
        };
        let id = self.progress.solving_order[index];
        let Some(constellation) = catalog::constellation(id) else {
            return TransitionResult::ignored();
        };

        let edge = Edge(from, to);
        if let Err(reason) = transitions::check_connection(constellation, self.board.drawn(), edge)
        {
            debug!("connect {from}-{to} on constellation {id} rejected: {reason:?}");
            let effects = if reason.is_audible() {
                vec![Effect::ConnectionInvalid]
            } else {
                Vec::new()
            };
            return TransitionResult {
                outcome: Outcome::Rejected,
                effects,
                ..Default::default()
            };
        }

        self.board.push(edge);
        let mut result = TransitionResult {
            effects: vec![Effect::ConnectionValid],
            ..Default::default()
        };
        if transitions::is_puzzle_complete(constellation, self.board.drawn()) {
            self.complete(id, &mut result);
        }
        result
    }

    fn handle_dismiss_note(&mut self) -> TransitionResult {
        let Phase::NoteShown { constellation_id } = self.phase else {
            debug!("dismiss_note ignored in {:?}", self.phase);
            return TransitionResult::ignored();
        };
        debug!("note for constellation {constellation_id} dismissed");
        let mut result = TransitionResult::default();
        self.advance(&mut result);
        result
    }

    fn handle_reset(&mut self) -> TransitionResult {
        self.progress = create_initial_progress(&mut self.rng);
        self.phase = Phase::InProgress { index: 0 };
        self.board.clear();
        self.refresh_guide();
        info!("play-through reset, solving order {:?}", self.progress.solving_order);
        TransitionResult {
            snapshot: Some(self.progress.clone()),
            ..Default::default()
        }
    }

    fn complete(&mut self, id: ConstellationId, result: &mut TransitionResult) {
        transitions::record_completion(&mut self.progress, id);
        result.completed = Some(id);
        result.effects.push(Effect::PuzzleSolved);
        info!(
            "constellation {id} ({}) complete",
            catalog::constellation(id).map_or("?", |c| c.glyph)
        );

        if transitions::should_unlock_note(&self.progress, id) {
            transitions::mark_note_viewed(&mut self.progress, id);
            self.phase = Phase::NoteShown {
                constellation_id: id,
            };
            result.note_unlocked = Some(id);
            // solved_count stays put until the note is dismissed
            result.snapshot = Some(self.progress.clone());
        } else {
            self.advance(result);
        }
    }

    fn advance(&mut self, result: &mut TransitionResult) {
        let finished = transitions::advance(&mut self.progress);
        self.board.clear();
        result.advanced = true;
        if finished {
            self.phase = Phase::Finale;
            result.finale_reached = true;
            info!("all {CONSTELLATION_COUNT} constellations solved");
        } else {
            self.phase = Phase::InProgress {
                index: self.progress.solved_count,
            };
        }
        self.refresh_guide();
        result.snapshot = Some(self.progress.clone());
    }

    fn refresh_guide(&mut self) {
        self.guide = match self.phase {
            Phase::Finale => None,
            _ => self
                .current_constellation()
                .map(|c| generate_guide(c, &self.constants, &mut self.rng)),
        };
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        crate::invariants::validate_invariants(&self.progress);
        if let Some(c) = self.current_constellation() {
            if let Err(violation) = crate::invariants::try_validate_board(c, &self.board) {
                panic!("Invariant violation: {violation}");
            }
        }
        let cursor_ok = match self.phase {
            Phase::InProgress { index } => index == self.progress.solved_count,
            Phase::NoteShown { constellation_id } => {
                transitions::current_id(&self.progress) == Some(constellation_id)
            }
            Phase::Finale => self.progress.solved_count == CONSTELLATION_COUNT,
        };
        assert!(cursor_ok, "phase {:?} disagrees with solved count", self.phase);
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> &PuzzleProgress {
        &self.progress
    }

    /// Copy of the persisted fields, ready to hand to the store.
    pub fn snapshot(&self) -> PuzzleProgress {
        self.progress.clone()
    }

    pub fn constants(&self) -> &EngineConstants {
        &self.constants
    }

    /// Constellation on screen; `None` once the finale is reached.
    pub fn current_constellation(&self) -> Option<&'static Constellation> {
        transitions::current_id(&self.progress).and_then(catalog::constellation)
    }

    pub fn drawn_connections(&self) -> &[Edge] {
        self.board.drawn()
    }

    pub fn connected_stars(&self) -> &BTreeSet<StarIndex> {
        self.board.connected()
    }

    pub fn completed_ids(&self) -> &[ConstellationId] {
        &self.progress.completed_ids
    }

    pub fn completed_count(&self) -> usize {
        self.progress.completed_ids.len()
    }

    /// Share of constellations completed, as a whole percentage.
    pub fn progress_percent(&self) -> u32 {
        let percent = self.completed_count() as f32 / CONSTELLATION_COUNT as f32 * 100.0;
        percent.round() as u32
    }

    /// Glyphs in id order, blank where the constellation is not solved yet.
    pub fn reveal_phrase(&self) -> Vec<&'static str> {
        catalog::CONSTELLATIONS
            .iter()
            .map(|c| {
                if self.progress.completed_ids.contains(&c.id) {
                    c.glyph
                } else {
                    BLANK
                }
            })
            .collect()
    }

    /// Text of the open note, if any.
    pub fn note_text(&self) -> Option<&'static str> {
        match self.phase {
            Phase::NoteShown { constellation_id } => {
                note_for(&self.progress.note_trigger_ids, constellation_id)
            }
            _ => None,
        }
    }

    pub fn is_note_shown(&self) -> bool {
        matches!(self.phase, Phase::NoteShown { .. })
    }

    pub fn is_finale(&self) -> bool {
        self.phase == Phase::Finale
    }

    /// Mirrored reference drawing of the constellation on screen.
    pub fn guide(&self) -> Option<&Guide> {
        self.guide.as_ref()
    }

    /// First star of the current constellation within the touch threshold of
    /// `point` (normalized coordinates).
    pub fn star_near(&self, point: Vec2) -> Option<StarIndex> {
        let constellation = self.current_constellation()?;
        constellation
            .stars
            .iter()
            .position(|star| star.distance(point) < self.constants.touch_threshold)
    }
}
