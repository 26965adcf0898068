/// Constellation puzzle: Input Events
///
/// Events are pure data: what the player asked for, nothing more.
/// All handling lives in the engine.

use crate::domain::StarIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleInput {
    /// Draw a line between two stars of the constellation on screen.
    Connect { from: StarIndex, to: StarIndex },
    /// Close the open note and move on.
    DismissNote,
    /// Start a brand-new play-through ("play again").
    Reset,
}

impl PuzzleInput {
    pub fn name(&self) -> &'static str {
        match self {
            PuzzleInput::Connect { .. } => "connect",
            PuzzleInput::DismissNote => "dismiss_note",
            PuzzleInput::Reset => "reset",
        }
    }
}
