//! Puzzle session: one engine wired to a store, a sound sink and timers.
//!
//! Apply-then-persist order for every handler:
//!   1. engine transition (pure, never fails)
//!   2. effects handed to the sink
//!   3. snapshot merged into the host record, skipped when unchanged
//!   4. deferred callbacks scheduled (note reveal, finale)
//!
//! Store failures are logged and swallowed: the in-memory engine stays
//! authoritative and the next successful write catches up.

use std::path::Path;

use glam::Vec2;
use log::{debug, info, warn};

use constellation_engine::domain::{
    ConstellationId, Effect, Outcome, Phase, PuzzleProgress, StarIndex, TransitionResult,
};
use constellation_engine::engine::{PuzzleEngine, ResumeOutcome};
use constellation_engine::hashing::canonical_hash;

use crate::config::RuntimeConfig;
use crate::effects::EffectSink;
use crate::snapshot;
use crate::snapshot_codec::{self, SnapshotError};
use crate::store::ProgressStore;
use crate::timers::Timers;
use crate::view::PuzzleView;

/// How the session found the stored progress.
#[derive(Debug)]
pub enum SessionStart {
    Fresh,
    Resumed,
    /// Stored progress was unreadable or invalid and has been replaced.
    Discarded(SnapshotError),
}

/// Notifications produced by `tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The pause after a completion ended; show the note now.
    NoteRevealed(ConstellationId),
    /// All twelve solved and admired. Fires once per session; nothing is
    /// persisted about it, so reopening a finished play-through announces
    /// it again.
    AllSolved(Vec<ConstellationId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    RevealNote(ConstellationId),
    AnnounceFinale,
}

pub struct PuzzleSession<S, E> {
    engine: PuzzleEngine,
    store: S,
    sink: E,
    config: RuntimeConfig,
    timers: Timers<Deferred>,
    now_ms: u64,
    drag_from: Option<StarIndex>,
    note_visible: bool,
    all_solved_sent: bool,
    last_saved_hash: Option<String>,
    torn_down: bool,
}

impl<S: ProgressStore, E: EffectSink> PuzzleSession<S, E> {
    /// Load progress from `store` and start the puzzle.
    pub fn open(store: S, sink: E, config: RuntimeConfig) -> (Self, SessionStart) {
        let (stored, failure) = Self::load_stored(&store, &config);
        let (engine, outcome) = PuzzleEngine::resume(stored, config.constants.clone());
        Self::start(engine, outcome, failure, store, sink, config)
    }

    /// `open` with reproducible randomness.
    pub fn open_seeded(store: S, sink: E, config: RuntimeConfig, seed: &str) -> (Self, SessionStart) {
        let (stored, failure) = Self::load_stored(&store, &config);
        let (engine, outcome) =
            PuzzleEngine::resume_with_seed(stored, seed, config.constants.clone());
        Self::start(engine, outcome, failure, store, sink, config)
    }

    fn load_stored(
        store: &S,
        config: &RuntimeConfig,
    ) -> (Option<PuzzleProgress>, Option<SnapshotError>) {
        match snapshot_codec::load_progress(store, &config.storage_key) {
            Ok(stored) => (stored, None),
            Err(err) => {
                warn!("stored progress discarded: {err}");
                (None, Some(err))
            }
        }
    }

    fn start(
        engine: PuzzleEngine,
        outcome: ResumeOutcome,
        failure: Option<SnapshotError>,
        store: S,
        sink: E,
        config: RuntimeConfig,
    ) -> (Self, SessionStart) {
        let start = match (failure, outcome) {
            (Some(err), _) => SessionStart::Discarded(err),
            (None, ResumeOutcome::Discarded(violation)) => SessionStart::Discarded(violation.into()),
            (None, ResumeOutcome::Fresh) => SessionStart::Fresh,
            (None, ResumeOutcome::Resumed) => SessionStart::Resumed,
        };

        let mut session = Self {
            engine,
            store,
            sink,
            config,
            timers: Timers::new(),
            now_ms: 0,
            drag_from: None,
            note_visible: false,
            all_solved_sent: false,
            last_saved_hash: None,
            torn_down: false,
        };

        match start {
            SessionStart::Resumed => {
                session.last_saved_hash = Some(canonical_hash(session.engine.progress()));
            }
            // the solving order must survive a reload before the first solve
            SessionStart::Fresh | SessionStart::Discarded(_) => {
                let progress = session.engine.snapshot();
                session.persist(&progress);
            }
        }
        if session.engine.is_finale() {
            session.schedule_finale();
        }
        (session, start)
    }

    // ── Handlers ───────────────────────────────────────────────────

    pub fn on_connection_attempt(&mut self, from: StarIndex, to: StarIndex) -> TransitionResult {
        if self.torn_down {
            return TransitionResult::ignored();
        }
        let result = self.engine.connect(from, to);
        self.after_transition(&result);
        result
    }

    /// Start a drag on `star`. Returns `false` if no drag can start here.
    pub fn on_pointer_down(&mut self, star: StarIndex) -> bool {
        if self.torn_down || !matches!(self.engine.phase(), Phase::InProgress { .. }) {
            return false;
        }
        let on_star = self
            .engine
            .current_constellation()
            .is_some_and(|c| star < c.star_count());
        if !on_star {
            return false;
        }
        self.drag_from = Some(star);
        self.sink.play(Effect::StarSelect);
        true
    }

    /// Finish a drag at `point`. A release away from every star, or back on
    /// the starting star, cancels silently.
    pub fn on_pointer_release(&mut self, point: Vec2) -> Option<TransitionResult> {
        let from = self.drag_from.take()?;
        let to = self.engine.star_near(point)?;
        if to == from {
            debug!("drag from star {from} released on itself");
            return None;
        }
        Some(self.on_connection_attempt(from, to))
    }

    pub fn on_pointer_cancel(&mut self) {
        self.drag_from = None;
    }

    pub fn on_note_dismiss(&mut self) -> TransitionResult {
        if self.torn_down {
            return TransitionResult::ignored();
        }
        let result = self.engine.dismiss_note();
        if result.outcome == Outcome::Accepted {
            self.note_visible = false;
        }
        self.after_transition(&result);
        result
    }

    /// Play again: new order, new notes, other record keys untouched.
    pub fn on_reset(&mut self) -> TransitionResult {
        if self.torn_down {
            return TransitionResult::ignored();
        }
        self.timers.invalidate();
        self.drag_from = None;
        self.note_visible = false;
        self.all_solved_sent = false;
        let result = self.engine.reset();
        self.after_transition(&result);
        result
    }

    fn after_transition(&mut self, result: &TransitionResult) {
        for &effect in &result.effects {
            self.sink.play(effect);
        }
        if let Some(progress) = &result.snapshot {
            self.persist(progress);
        }
        if result.advanced {
            self.drag_from = None;
        }
        if let Some(id) = result.note_unlocked {
            self.drag_from = None;
            self.note_visible = false;
            self.timers.schedule(
                self.now_ms + self.config.note_reveal_delay_ms,
                Deferred::RevealNote(id),
            );
        }
        if result.finale_reached {
            self.schedule_finale();
        }
    }

    fn schedule_finale(&mut self) {
        self.timers.schedule(
            self.now_ms + self.config.finale_admire_ms,
            Deferred::AnnounceFinale,
        );
    }

    // ── Time ───────────────────────────────────────────────────────

    /// Advance the logical clock and run whatever fell due.
    ///
    /// `now_ms` counts milliseconds since the session was opened; callbacks
    /// scheduled while opening (the finale on a finished resume) are due
    /// relative to zero.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        if self.torn_down {
            return Vec::new();
        }
        self.now_ms = self.now_ms.max(now_ms);

        let mut events = Vec::new();
        for action in self.timers.take_due(self.now_ms) {
            match action {
                Deferred::RevealNote(id) => {
                    if self.engine.phase() == (Phase::NoteShown { constellation_id: id }) {
                        info!("showing note for constellation {id}");
                        self.note_visible = true;
                        events.push(SessionEvent::NoteRevealed(id));
                    }
                }
                Deferred::AnnounceFinale => {
                    if self.engine.is_finale() && !self.all_solved_sent {
                        self.all_solved_sent = true;
                        let mut ids = self.engine.completed_ids().to_vec();
                        ids.sort_unstable();
                        info!("puzzle finished, announcing all {} constellations", ids.len());
                        events.push(SessionEvent::AllSolved(ids));
                    }
                }
            }
        }
        events
    }

    /// Stop the session. Pending callbacks are dropped and later input or
    /// ticks do nothing.
    pub fn teardown(&mut self) {
        self.timers.invalidate();
        self.drag_from = None;
        self.torn_down = true;
    }

    // ── Persistence ────────────────────────────────────────────────

    fn persist(&mut self, progress: &PuzzleProgress) {
        let hash = canonical_hash(progress);
        if self.last_saved_hash.as_deref() == Some(hash.as_str()) {
            debug!("progress unchanged, skipping write");
            return;
        }
        match snapshot_codec::save_progress(&mut self.store, &self.config.storage_key, progress) {
            Ok(()) => self.last_saved_hash = Some(hash),
            Err(err) => warn!("could not save progress: {err}"),
        }
    }

    pub fn export_backup(&self, path: &Path) -> Result<(), SnapshotError> {
        snapshot::export_backup(self.engine.progress(), path)
    }

    /// Replace the live play-through with a verified backup.
    pub fn restore_backup(&mut self, path: &Path) -> Result<(), SnapshotError> {
        let progress = snapshot::import_backup(path)?;
        let engine = PuzzleEngine::try_resume(progress.clone(), self.engine.constants().clone())?;
        info!("restored backup from {}", path.display());

        self.engine = engine;
        self.timers.invalidate();
        self.drag_from = None;
        self.note_visible = false;
        self.all_solved_sent = false;
        self.persist(&progress);
        if self.engine.is_finale() {
            self.schedule_finale();
        }
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn view(&self) -> PuzzleView {
        PuzzleView::build(&self.engine, self.note_visible, self.drag_from)
    }

    pub fn engine(&self) -> &PuzzleEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_note_visible(&self) -> bool {
        self.note_visible
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
