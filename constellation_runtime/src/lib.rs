#![forbid(unsafe_code)]

//! Constellation puzzle runtime.
//!
//! Wraps the engine with everything the host page needs: a key-value
//! progress store, the snapshot codec with fail-safe restore, backup files,
//! sound-effect routing, deferred callbacks and the session that ties them
//! together.
//!
//! No puzzle rules live here; every transition is delegated to the engine.

pub mod config;
pub mod store;
pub mod record;
pub mod snapshot_codec;
pub mod snapshot;
pub mod effects;
pub mod timers;
pub mod view;
pub mod session;
