//! Session identity and staleness rejection
//!
//! Each analyze or discover run is issued a [`SessionId`] from a counter
//! that only grows. Updates carry the id they were issued under and are
//! dropped unless it is still the current one, so a superseded session's
//! late events can never reach its replacement's state.

use derive_more::Display;
use parking_lot::Mutex;
use tracing::debug;

use crate::infrastructure::log_messages::client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("session-{_0}")]
pub struct SessionId(u64);

#[derive(Debug)]
struct Inner<S> {
    current: SessionId,
    state: S,
}

/// Owner of one piece of session-scoped state
#[derive(Debug)]
pub struct SessionController<S> {
    inner: Mutex<Inner<S>>,
}

impl<S: Clone + Default> Default for SessionController<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Clone> SessionController<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: SessionId(0),
                state: initial,
            }),
        }
    }

    /// Supersede the current session and install `initial` as the new state
    pub fn begin(&self, initial: S) -> SessionId {
        let mut inner = self.inner.lock();
        inner.current = SessionId(inner.current.0 + 1);
        inner.state = initial;
        debug!(session = %inner.current, "{}", client::SESSION_STARTED);
        inner.current
    }

    /// Supersede the current session without starting a new one
    pub fn reset(&self, initial: S) {
        self.begin(initial);
    }

    /// Fold an update into the state if `id` is still current
    ///
    /// Returns `false`, leaving the state untouched, when `id` is stale.
    pub fn apply(&self, id: SessionId, update: impl FnOnce(S) -> S) -> bool {
        let mut inner = self.inner.lock();
        if inner.current != id {
            debug!(stale = %id, current = %inner.current, "{}", client::STALE_EVENT_DROPPED);
            return false;
        }
        let next = update(inner.state.clone());
        inner.state = next;
        true
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.inner.lock().current == id
    }

    pub fn current(&self) -> SessionId {
        self.inner.lock().current
    }

    pub fn snapshot(&self) -> S {
        self.inner.lock().state.clone()
    }
}
