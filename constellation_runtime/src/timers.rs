//! Deferred callbacks on a logical clock.
//!
//! The host drives time through `take_due(now_ms)`. `invalidate` starts a
//! new generation: anything scheduled before it never fires, which is how
//! teardown and "play again" cancel a pending note reveal or finale.

/// Handle for a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TimerId,
    due_ms: u64,
    generation: u64,
    action: T,
}

#[derive(Debug)]
pub struct Timers<T> {
    pending: Vec<Scheduled<T>>,
    next_id: u64,
    generation: u64,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
            generation: 0,
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, action: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due_ms,
            generation: self.generation,
            action,
        });
        id
    }

    /// Cancel one callback. Returns `false` if it already fired or was
    /// invalidated.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let generation = self.generation;
        let before = self.len();
        self.pending.retain(|s| s.id != id && s.generation == generation);
        self.pending.len() != before
    }

    /// Remove and return every live callback due at `now_ms`, earliest first;
    /// ties fire in scheduling order.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<T> {
        let generation = self.generation;
        self.pending.retain(|s| s.generation == generation);

        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| s.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by_key(|s| (s.due_ms, s.id));
        due.into_iter().map(|s| s.action).collect()
    }

    /// Stale entries are purged lazily on the next `take_due`.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pending
            .iter()
            .filter(|s| s.generation == self.generation)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
