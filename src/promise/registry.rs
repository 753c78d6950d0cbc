//! Registry of outstanding episode promises and their controls.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::ResourceError;

use super::{promise_pair, PromiseControls, PromiseId, ResourcePromise};

/// Store from promise identity to its settle controls.
///
/// Keeping one promise alive across every snapshot of an episode means
/// its resolve/reject pair must be held somewhere until settlement.
/// Entries are removed when the promise settles (resolve and reject take
/// the controls out of the map before sending) and when an episode is
/// replaced at renewal, so the map never accumulates settled promises —
/// an entry still in the registry has not settled yet.
///
/// Each resource owns its registry instance; there is no process-wide
/// default, so tests and independent resources stay isolated.
pub struct PromiseRegistry<T: Clone> {
    entries: Mutex<HashMap<PromiseId, PromiseControls<T>>>,
}

impl<T: Clone> PromiseRegistry<T> {
    /// Empty registry.
    pub fn new() -> Self {
        PromiseRegistry {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh outstanding promise and track its controls.
    pub fn mint(&self) -> ResourcePromise<T> {
        let (promise, controls) = promise_pair();
        self.entries.lock().insert(promise.id(), controls);
        trace!(id = ?promise.id(), "minted episode promise");
        promise
    }

    /// Resolve the tracked promise with `value`.
    ///
    /// Returns `false` without effect when the promise already settled or
    /// was never tracked — never an "already settled" error.
    pub fn resolve(&self, id: PromiseId, value: T) -> bool {
        match self.take(id) {
            Some(controls) => {
                trace!(?id, "resolving episode promise");
                controls.resolve(value);
                true
            }
            None => false,
        }
    }

    /// Reject the tracked promise with `error`. Same no-op contract as
    /// [`PromiseRegistry::resolve`].
    pub fn reject(&self, id: PromiseId, error: ResourceError) -> bool {
        match self.take(id) {
            Some(controls) => {
                trace!(?id, %error, "rejecting episode promise");
                controls.reject(error);
                true
            }
            None => false,
        }
    }

    /// Drop the entry without settling it.
    ///
    /// Outstanding waiters observe an abort once the controls are gone,
    /// so forgetting an un-settled promise cannot strand a consumer.
    pub fn forget(&self, id: PromiseId) {
        if self.take(id).is_some() {
            trace!(?id, "forgot episode promise");
        }
    }

    /// Is the promise still outstanding?
    pub fn contains(&self, id: PromiseId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Number of outstanding promises.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no promise is outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn take(&self, id: PromiseId) -> Option<PromiseControls<T>> {
        self.entries.lock().remove(&id)
    }
}

impl<T: Clone> Default for PromiseRegistry<T> {
    fn default() -> Self {
        PromiseRegistry::new()
    }
}

impl<T: Clone> fmt::Debug for PromiseRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseRegistry")
            .field("len", &self.len())
            .finish()
    }
}
