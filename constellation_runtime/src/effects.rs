//! Sound-effect routing. The runtime only names the cue; playing it is up
//! to whatever implements `EffectSink`.

use constellation_engine::domain::Effect;

pub trait EffectSink {
    fn play(&mut self, effect: Effect);
}

/// Records cues in order. Handy for tests and for batching to a frontend.
impl EffectSink for Vec<Effect> {
    fn play(&mut self, effect: Effect) {
        self.push(effect);
    }
}

/// Drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn play(&mut self, _effect: Effect) {}
}

/// Sink wrapper with a mute switch for sound effects.
#[derive(Debug, Default, Clone)]
pub struct Mixer<S> {
    inner: S,
    muted: bool,
}

impl<S: EffectSink> Mixer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, muted: false }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Flip the mute switch; returns the new state.
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: EffectSink> EffectSink for Mixer<S> {
    fn play(&mut self, effect: Effect) {
        if self.muted {
            log::trace!("muted: {}", effect.name());
            return;
        }
        self.inner.play(effect);
    }
}
