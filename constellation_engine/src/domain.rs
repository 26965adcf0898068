/// Constellation puzzle: Core Domain Types
///
/// Pure data. No transition logic lives here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{endpoints, Edge};

/// Identity of one of the twelve constellations (0..12).
pub type ConstellationId = usize;

/// Index of a star inside a single constellation.
pub type StarIndex = usize;

// ── Persisted aggregate ────────────────────────────────────────────

/// Progress through one play-through. This is the record the host persists.
///
/// Field names on the wire are camelCase. Records written by older builds used
/// `constellationsCompleted`, `noteIndices` and `viewedNotes`; those names are
/// still accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PuzzleProgress {
    /// Order in which the player meets the constellations. A permutation of 0..12.
    pub solving_order: Vec<ConstellationId>,
    /// Number of constellations solved and advanced past.
    ///
    /// Also the cursor into `solving_order`: the puzzle on screen is
    /// `solving_order[solved_count]`. Both roles are carried by the one field
    /// and must stay equal; 12 means the finale.
    pub solved_count: usize,
    /// Constellations fully drawn. May hold the in-flight id one step ahead of
    /// `solved_count` while its note is open.
    #[serde(alias = "constellationsCompleted")]
    pub completed_ids: Vec<ConstellationId>,
    /// The seven constellations that unlock a note. Order matters: position `i`
    /// shows note text `i`.
    #[serde(alias = "noteIndices")]
    pub note_trigger_ids: Vec<ConstellationId>,
    /// Trigger ids whose note has already been shown.
    #[serde(alias = "viewedNotes")]
    pub viewed_note_ids: Vec<ConstellationId>,
}

// ── Engine state ───────────────────────────────────────────────────

/// Where the play-through currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Drawing `solving_order[index]`; `index == solved_count`.
    InProgress { index: usize },
    /// A solved constellation unlocked a note. Drawing is suspended until the
    /// note is dismissed.
    NoteShown { constellation_id: ConstellationId },
    /// All twelve solved.
    Finale,
}

/// Lines drawn so far on the constellation on screen. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    drawn: Vec<Edge>,
    connected: BTreeSet<StarIndex>,
}

impl Board {
    /// Drawn edges in the order they were accepted.
    pub fn drawn(&self) -> &[Edge] {
        &self.drawn
    }

    /// Stars touched by at least one drawn edge.
    pub fn connected(&self) -> &BTreeSet<StarIndex> {
        &self.connected
    }

    pub(crate) fn push(&mut self, edge: Edge) {
        self.drawn.push(edge);
        self.connected.insert(edge.0);
        self.connected.insert(edge.1);
    }

    pub(crate) fn clear(&mut self) {
        self.drawn.clear();
        self.connected.clear();
    }

    /// True if the connected-star set agrees with the drawn edges.
    pub fn is_consistent(&self) -> bool {
        endpoints(&self.drawn) == self.connected
    }
}

// ── Outputs ────────────────────────────────────────────────────────

/// Sound cue requested by a transition. Playback belongs to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    StarSelect,
    ConnectionValid,
    ConnectionInvalid,
    PuzzleSolved,
}

impl Effect {
    /// Stable cue name handed to the audio layer.
    pub fn name(self) -> &'static str {
        match self {
            Effect::StarSelect => "star-select",
            Effect::ConnectionValid => "connection-valid",
            Effect::ConnectionInvalid => "connection-invalid",
            Effect::PuzzleSolved => "puzzle-solved",
        }
    }
}

/// How the engine treated an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The input changed state.
    Accepted,
    /// Valid to ask, but refused (wrong pair, duplicate, self-connection).
    Rejected,
    /// Not allowed in the current phase; nothing happened.
    Ignored,
}

/// Structured outcome of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
    /// Constellation completed by this transition.
    pub completed: Option<ConstellationId>,
    /// Constellation whose note was unlocked by this transition.
    pub note_unlocked: Option<ConstellationId>,
    /// The cursor moved to the next constellation (or the finale).
    pub advanced: bool,
    pub finale_reached: bool,
    /// Progress to persist, present whenever a persisted field changed.
    pub snapshot: Option<PuzzleProgress>,
}

impl Default for TransitionResult {
    fn default() -> Self {
        Self {
            outcome: Outcome::Accepted,
            effects: Vec::new(),
            completed: None,
            note_unlocked: None,
            advanced: false,
            finale_reached: false,
            snapshot: None,
        }
    }
}

impl TransitionResult {
    pub fn ignored() -> Self {
        Self {
            outcome: Outcome::Ignored,
            ..Default::default()
        }
    }
}

// ── Tunables ───────────────────────────────────────────────────────

/// Engine tunables. All distances are in the normalized 0..100 space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConstants {
    /// A pointer release closer than this to a star counts as landing on it.
    pub touch_threshold: f32,
    /// Horizontal jitter applied to guide stars, ± this amount.
    pub guide_jitter_x: f32,
    /// Vertical jitter applied to guide stars, ± this amount.
    pub guide_jitter_y: f32,
    pub guide_min: f32,
    pub guide_max: f32,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            touch_threshold: 6.0,
            guide_jitter_x: 5.0,
            guide_jitter_y: 4.0,
            guide_min: 10.0,
            guide_max: 90.0,
        }
    }
}
