/// Constellation puzzle: State Construction
///
/// Fresh play-throughs and the deterministic RNG seeding used to build them.

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use sha2::{Digest, Sha256};

use crate::catalog::CONSTELLATION_COUNT;
use crate::domain::{ConstellationId, PuzzleProgress};
use crate::notes::NOTE_COUNT;

/// Create the progress record for a new play-through: a shuffled solving
/// order, nothing solved, and seven note triggers drawn without replacement.
pub fn create_initial_progress<R: Rng + ?Sized>(rng: &mut R) -> PuzzleProgress {
    let mut solving_order: Vec<ConstellationId> = (0..CONSTELLATION_COUNT).collect();
    solving_order.shuffle(rng);

    // sample() returns the picks in random order; that order is the note mapping
    let note_trigger_ids = index::sample(rng, CONSTELLATION_COUNT, NOTE_COUNT).into_vec();

    PuzzleProgress {
        solving_order,
        solved_count: 0,
        completed_ids: Vec::new(),
        note_trigger_ids,
        viewed_note_ids: Vec::new(),
    }
}

/// Deterministic generator keyed by an arbitrary string.
pub fn seeded_rng(seed: &str) -> ChaCha12Rng {
    let digest = Sha256::digest(seed.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    ChaCha12Rng::from_seed(key)
}

/// Generator seeded from the thread RNG.
pub fn entropy_rng() -> ChaCha12Rng {
    ChaCha12Rng::from_rng(&mut rand::rng())
}
