//! Cancellable delayed actions keyed to a clock.
//!
//! Actions are queued with a due time on either the game clock (which stops
//! while paused or frozen) or the real clock, and are handed back by
//! [`ContinuationQueue::poll`] once that clock reaches their due time.

/// Which clock a continuation waits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clock {
    /// Scaled game time.
    Game,
    /// Wall-clock time, unaffected by time scale.
    Real,
}

/// Handle to a scheduled continuation, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContinuationId(u64);

#[derive(Clone, Debug)]
struct Pending<T> {
    id: ContinuationId,
    clock: Clock,
    due: f64,
    action: T,
}

/// Queue of delayed actions polled once per tick.
#[derive(Clone, Debug)]
pub struct ContinuationQueue<T> {
    pending: Vec<Pending<T>>,
    /// Monotonically increasing id counter.
    next_id: u64,
}

impl<T> Default for ContinuationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContinuationQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Queue `action` to fire when `clock` reaches `due`.
    pub fn schedule(&mut self, clock: Clock, due: f64, action: T) -> ContinuationId {
        let id = ContinuationId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            clock,
            due,
            action,
        });
        id
    }

    /// Remove a continuation before it fires. Returns whether it was pending.
    pub fn cancel(&mut self, id: ContinuationId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every continuation on `clock` that is due at `now`.
    ///
    /// Returned in due-time order; ties fire in scheduling order.
    pub fn poll(&mut self, clock: Clock, now: f64) -> Vec<T> {
        let (mut ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.clock == clock && p.due <= now);
        self.pending = waiting;

        ready.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        ready.into_iter().map(|p| p.action).collect()
    }
}
