#![forbid(unsafe_code)]

//! Constellation puzzle engine.
//!
//! Twelve star patterns are solved in a shuffled order; each one reveals a
//! glyph of the final phrase. The engine owns the solving sequence, validates
//! drawn connections, schedules the unlockable notes and produces the
//! progress snapshots the host persists between reloads.
//!
//! Nothing in this crate performs I/O.

/// Layout version of the persisted progress record.
pub const PROGRESS_FORMAT_VERSION: u32 = 1;

pub mod domain;
pub mod graph;
pub mod catalog;
pub mod notes;
pub mod events;
pub mod state;
pub mod guide;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;
