/// Unlockable notes.
///
/// Seven of the twelve constellations reveal a note the first time they are
/// solved. Which text appears is decided by the position of the constellation
/// id inside `note_trigger_ids`, never by the id itself.

use crate::domain::ConstellationId;

pub const NOTE_COUNT: usize = 7;

pub static NOTES: [&str; NOTE_COUNT] = [
    "Every star up here was placed by hand, one for each time you made me laugh this year.",
    "You once said the sky looks closer in winter. I think it just wanted a better look at you.",
    "If you are reading this, you have been patient with a puzzle. You are patient with me too. Thank you.",
    "Halfway there. I would happily spend the other half of the night right here with you.",
    "Some constellations take thousands of years to drift apart. I am planning on longer.",
    "You are the brightest point on every map I have ever drawn.",
    "Almost done. Look up when you finish and read what the stars have been spelling.",
];

/// Note text shown when `id` unlocks its note, or `None` for non-trigger ids.
pub fn note_for(note_trigger_ids: &[ConstellationId], id: ConstellationId) -> Option<&'static str> {
    note_trigger_ids
        .iter()
        .position(|&t| t == id)
        .and_then(|slot| NOTES.get(slot).copied())
}
