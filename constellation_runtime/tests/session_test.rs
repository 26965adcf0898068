//! Integration tests for constellation_runtime.
//!
//! File-backed tests use temporary directories for isolation.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use serde_json::{json, Value};

use constellation_engine::catalog::CONSTELLATION_COUNT;
use constellation_engine::domain::{Effect, Outcome, Phase, PuzzleProgress};
use constellation_engine::notes::NOTES;

use constellation_runtime::config::RuntimeConfig;
use constellation_runtime::effects::{EffectSink, Mixer, NullSink};
use constellation_runtime::record::parse_record;
use constellation_runtime::session::{PuzzleSession, SessionEvent, SessionStart};
use constellation_runtime::snapshot_codec::{load_progress, SnapshotError};
use constellation_runtime::store::{DirStore, MemoryStore, ProgressStore, StoreError};

const KEY: &str = "valentine_progress";

fn progress(solved_count: usize, completed: Vec<usize>, viewed: Vec<usize>) -> PuzzleProgress {
    PuzzleProgress {
        solving_order: vec![3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
        solved_count,
        completed_ids: completed,
        note_trigger_ids: vec![3, 1, 2, 4, 5, 6, 7],
        viewed_note_ids: viewed,
    }
}

/// Host record holding `progress` plus keys owned by other parts of the card.
fn store_with(progress: &PuzzleProgress) -> MemoryStore {
    let mut record = json!({ "accepted": true, "phase": "puzzle" });
    let fields = serde_json::to_value(progress).unwrap();
    for (k, v) in fields.as_object().unwrap() {
        record[k] = v.clone();
    }
    MemoryStore::with_entry(KEY, &record.to_string())
}

fn stored_record(store: &MemoryStore) -> Value {
    serde_json::from_str(store.get(KEY).unwrap()).unwrap()
}

type TestSession = PuzzleSession<MemoryStore, Mixer<Vec<Effect>>>;

fn open(store: MemoryStore, seed: &str) -> (TestSession, SessionStart) {
    PuzzleSession::open_seeded(store, Mixer::new(Vec::new()), RuntimeConfig::default(), seed)
}

/// Draw every line of the constellation on screen; returns the last result.
fn solve_current<S: ProgressStore, E: EffectSink>(
    session: &mut PuzzleSession<S, E>,
) -> constellation_engine::domain::TransitionResult {
    let edges = session
        .engine()
        .current_constellation()
        .expect("constellation on screen")
        .connections;
    let mut last = None;
    for edge in edges {
        last = Some(session.on_connection_attempt(edge.0, edge.1));
    }
    last.expect("every constellation has lines")
}

// ─────────────────────────────────────────────────────────────
// Start-up
// ─────────────────────────────────────────────────────────────

#[test]
fn fresh_start_persists_order_immediately() {
    let (session, start) = open(MemoryStore::new(), "fresh");
    assert!(matches!(start, SessionStart::Fresh));

    let saved = load_progress(session.store(), KEY).unwrap().unwrap();
    assert_eq!(saved, session.engine().snapshot());

    let (reopened, start) = open(session.store().clone(), "other seed");
    assert!(matches!(start, SessionStart::Resumed));
    assert_eq!(reopened.engine().progress().solving_order, saved.solving_order);
}

#[test]
fn record_without_puzzle_keys_starts_fresh_and_keeps_host_keys() {
    let store = MemoryStore::with_entry(KEY, r#"{"accepted":true,"phase":"countdown"}"#);
    let (session, start) = open(store, "host");
    assert!(matches!(start, SessionStart::Fresh));

    let record = stored_record(session.store());
    assert_eq!(record["accepted"], json!(true));
    assert_eq!(record["phase"], json!("countdown"));
    assert_eq!(record["solvedCount"], json!(0));
}

#[test]
fn garbage_record_is_discarded() {
    let store = MemoryStore::with_entry(KEY, "{ definitely not json");
    let (session, start) = open(store, "garbage");
    assert!(matches!(
        start,
        SessionStart::Discarded(SnapshotError::Deserialization(_))
    ));
    assert!(load_progress(session.store(), KEY).unwrap().is_some());
}

#[test]
fn invalid_progress_is_discarded_but_host_keys_survive() {
    let mut bad = progress(0, vec![], vec![]);
    bad.note_trigger_ids.truncate(3);
    let (session, start) = open(store_with(&bad), "invalid");

    assert!(matches!(
        start,
        SessionStart::Discarded(SnapshotError::InvariantViolation(_))
    ));
    let record = stored_record(session.store());
    assert_eq!(record["accepted"], json!(true));
    assert_eq!(record["noteTriggerIds"].as_array().unwrap().len(), 7);
    assert_eq!(session.engine().phase(), Phase::InProgress { index: 0 });
}

// ─────────────────────────────────────────────────────────────
// Notes and timers
// ─────────────────────────────────────────────────────────────

#[test]
fn note_appears_after_reveal_delay() {
    let (mut session, start) = open(store_with(&progress(0, vec![], vec![])), "note");
    assert!(matches!(start, SessionStart::Resumed));

    let result = solve_current(&mut session);
    assert_eq!(result.note_unlocked, Some(3));
    assert!(!session.view().note_visible);

    // the viewed bit is on disk before the note is even visible
    let saved = load_progress(session.store(), KEY).unwrap().unwrap();
    assert_eq!(saved, progress(0, vec![3], vec![3]));

    assert!(session.tick(1_499).is_empty());
    assert_eq!(session.tick(1_500), vec![SessionEvent::NoteRevealed(3)]);
    let view = session.view();
    assert!(view.note_visible);
    assert_eq!(view.note_text, Some(NOTES[0]));

    let dismissed = session.on_note_dismiss();
    assert!(dismissed.advanced);
    assert!(!session.view().note_visible);
    assert_eq!(
        load_progress(session.store(), KEY).unwrap().unwrap().solved_count,
        1
    );
    assert_eq!(session.view().constellation_id, Some(0));
}

#[test]
fn reload_during_note_resumes_on_same_puzzle() {
    let (mut session, start) = open(store_with(&progress(0, vec![3], vec![3])), "reload");
    assert!(matches!(start, SessionStart::Resumed));
    assert_eq!(session.view().constellation_id, Some(3));

    let result = solve_current(&mut session);
    assert_eq!(result.note_unlocked, None);
    assert!(result.advanced);
    assert!(session.tick(10_000).is_empty());
}

#[test]
fn teardown_cancels_pending_reveal() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "teardown");
    solve_current(&mut session);
    assert!(session.has_pending_timers());

    session.teardown();
    assert!(session.is_torn_down());
    assert!(session.tick(5_000).is_empty());
    assert_eq!(session.on_connection_attempt(0, 1).outcome, Outcome::Ignored);
}

#[test]
fn reset_cancels_pending_reveal_and_keeps_host_keys() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "reset");
    solve_current(&mut session);

    let result = session.on_reset();
    assert!(result.snapshot.is_some());
    assert!(session.tick(5_000).is_empty());
    assert_eq!(session.engine().phase(), Phase::InProgress { index: 0 });

    let record = stored_record(session.store());
    assert_eq!(record["accepted"], json!(true));
    assert_eq!(record["phase"], json!("puzzle"));
    assert_eq!(record["completedIds"], json!([]));
    assert_eq!(record["viewedNoteIds"], json!([]));
}

// ─────────────────────────────────────────────────────────────
// Full play-through
// ─────────────────────────────────────────────────────────────

#[test]
fn all_solved_fires_once_after_admire_delay() {
    let (mut session, _) = open(MemoryStore::new(), "complete run");
    let mut now = 0;
    let mut notes = 0;

    while !session.engine().is_finale() {
        let result = solve_current(&mut session);
        assert_eq!(result.outcome, Outcome::Accepted);
        if result.note_unlocked.is_some() {
            now += 1_500;
            let events = session.tick(now);
            assert!(matches!(events.as_slice(), [SessionEvent::NoteRevealed(_)]));
            notes += 1;
            session.on_note_dismiss();
        }
    }
    assert_eq!(notes, 7);

    assert!(session.tick(now + 7_999).is_empty());
    let events = session.tick(now + 8_000);
    assert_eq!(
        events,
        vec![SessionEvent::AllSolved((0..CONSTELLATION_COUNT).collect())]
    );
    assert!(session.tick(now + 100_000).is_empty());

    let view = session.view();
    assert!(view.finale);
    assert_eq!(view.constellation_id, None);
    assert_eq!(view.progress_percent, 100);
    assert_eq!(view.counter_label(), "12 of 12");
    assert_eq!(view.reveal_phrase.concat(), "Faith&Alvin❤️");

    let solved = session
        .sink()
        .inner()
        .iter()
        .filter(|e| **e == Effect::PuzzleSolved)
        .count();
    assert_eq!(solved, CONSTELLATION_COUNT);
}

#[test]
fn resuming_into_finale_announces_once() {
    let order: Vec<usize> = vec![3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11];
    let done = PuzzleProgress {
        solving_order: order.clone(),
        solved_count: 12,
        completed_ids: order,
        note_trigger_ids: vec![3, 1, 2, 4, 5, 6, 7],
        viewed_note_ids: vec![3, 1, 2, 4, 5, 6, 7],
    };
    let (mut session, start) = open(store_with(&done), "finale");
    assert!(matches!(start, SessionStart::Resumed));
    assert!(session.view().guide.is_none());

    // the admire delay counts from the moment the session opened
    assert!(session.tick(7_999).is_empty());
    let events = session.tick(8_000);
    assert!(matches!(events.as_slice(), [SessionEvent::AllSolved(ids)] if ids.len() == 12));
    assert!(session.tick(20_000).is_empty());

    // a reopened finished play-through announces again in the new session
    let (mut reopened, _) = open(session.store().clone(), "finale again");
    assert!(matches!(
        reopened.tick(8_000).as_slice(),
        [SessionEvent::AllSolved(_)]
    ));
}

// ─────────────────────────────────────────────────────────────
// Pointer flow and sound
// ─────────────────────────────────────────────────────────────

#[test]
fn drag_between_stars_connects() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "drag");
    let stars = session.engine().current_constellation().unwrap().stars;

    assert!(session.on_pointer_down(0));
    assert_eq!(session.view().drag_from, Some(0));
    let result = session
        .on_pointer_release(stars[1] + Vec2::new(0.5, -0.5))
        .expect("released on a star");
    assert_eq!(result.outcome, Outcome::Accepted);
    assert_eq!(session.view().drawn_connections, vec![[0, 1]]);
    assert_eq!(
        session.sink().inner(),
        &vec![Effect::StarSelect, Effect::ConnectionValid]
    );
}

#[test]
fn release_in_empty_space_cancels() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "cancel");
    assert!(session.on_pointer_down(0));
    assert!(session.on_pointer_release(Vec2::new(-40.0, -40.0)).is_none());
    assert_eq!(session.view().drag_from, None);
    assert!(session.on_pointer_release(Vec2::ZERO).is_none());
    assert!(!session.on_pointer_down(99));
}

#[test]
fn pointer_cancel_drops_the_drag() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "pointer cancel");
    let stars = session.engine().current_constellation().unwrap().stars;
    assert!(session.on_pointer_down(0));
    session.on_pointer_cancel();
    assert_eq!(session.view().drag_from, None);
    assert!(session.on_pointer_release(stars[1]).is_none());
    assert!(session.view().drawn_connections.is_empty());
}

#[test]
fn muted_mixer_plays_nothing() {
    let (mut session, _) = open(store_with(&progress(0, vec![], vec![])), "mute");
    session.sink_mut().set_muted(true);
    session.on_connection_attempt(0, 1);
    session.on_connection_attempt(0, 3);
    assert!(session.sink().inner().is_empty());
    assert!(session.sink().is_muted());
}

// ─────────────────────────────────────────────────────────────
// Stores and backups
// ─────────────────────────────────────────────────────────────

#[test]
fn dir_store_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut session, _) = PuzzleSession::open_seeded(
        DirStore::new(tmp.path()),
        NullSink,
        RuntimeConfig::default(),
        "disk",
    );
    solve_current(&mut session);
    let expected = session.engine().snapshot();
    drop(session);

    let (reopened, start) =
        PuzzleSession::open(DirStore::new(tmp.path()), NullSink, RuntimeConfig::default());
    assert!(matches!(start, SessionStart::Resumed));
    assert_eq!(reopened.engine().snapshot(), expected);
    assert!(tmp.path().join(format!("{KEY}.json")).exists());
}

#[test]
fn non_utf8_record_on_disk_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(format!("{KEY}.json")), [0xff, 0xfe, b'{']).unwrap();

    let (mut session, start) = PuzzleSession::open_seeded(
        DirStore::new(tmp.path()),
        NullSink,
        RuntimeConfig::default(),
        "bad bytes",
    );
    assert!(matches!(
        start,
        SessionStart::Discarded(SnapshotError::Store(StoreError::Io(_)))
    ));
    solve_current(&mut session);
    if session.engine().is_note_shown() {
        session.on_note_dismiss();
    }
    let expected = session.engine().snapshot();
    assert_eq!(expected.solved_count, 1);
    drop(session);

    let reloaded = load_progress(&DirStore::new(tmp.path()), KEY).unwrap();
    assert_eq!(reloaded, Some(expected));
}

#[test]
fn backup_restore_replaces_progress() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("backup.json");

    let (mut first, _) = open(store_with(&progress(0, vec![], vec![])), "backup");
    solve_current(&mut first);
    first.on_note_dismiss();
    first.export_backup(&path).unwrap();

    let (mut second, _) = open(MemoryStore::new(), "elsewhere");
    second.restore_backup(&path).unwrap();
    assert_eq!(second.engine().snapshot(), first.engine().snapshot());
    assert_eq!(
        load_progress(second.store(), KEY).unwrap(),
        Some(first.engine().snapshot())
    );
}

/// Store that counts writes and can be told to fail them.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    saves: Rc<Cell<usize>>,
    failing: Rc<Cell<bool>>,
}

impl ProgressStore for FlakyStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.get() {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.saves.set(self.saves.get() + 1);
        self.inner.save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

#[test]
fn unchanged_progress_is_not_rewritten() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("same.json");
    let store = FlakyStore::default();
    let saves = store.saves.clone();

    let (mut session, _) =
        PuzzleSession::open_seeded(store, NullSink, RuntimeConfig::default(), "same");
    assert_eq!(saves.get(), 1);

    session.export_backup(&path).unwrap();
    session.restore_backup(&path).unwrap();
    assert_eq!(saves.get(), 1);

    session.on_connection_attempt(0, 0);
    assert_eq!(saves.get(), 1);
}

#[test]
fn store_failures_do_not_stop_play() {
    let store = FlakyStore::default();
    store.failing.set(true);
    let saves = store.saves.clone();

    let (mut session, start) =
        PuzzleSession::open_seeded(store, NullSink, RuntimeConfig::default(), "flaky");
    assert!(matches!(start, SessionStart::Fresh));
    let result = solve_current(&mut session);
    assert_eq!(result.outcome, Outcome::Accepted);
    assert_eq!(session.engine().completed_count(), 1);
    assert_eq!(saves.get(), 0);
}

#[test]
fn stored_record_is_an_object_with_host_keys() {
    let (session, _) = open(store_with(&progress(0, vec![], vec![])), "object");
    let record = parse_record(session.store().get(KEY).unwrap()).unwrap();
    assert!(record.contains_key("accepted"));
    assert!(record.contains_key("solvingOrder"));
}
