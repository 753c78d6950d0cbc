//! Episode promises: cloneable, settle-once awaitables with explicit identity.
//!
//! For suspense to work, every consumer of one suspension episode must
//! rendezvous on the same awaitable, and that awaitable must settle
//! exactly once. [`ResourcePromise`] is that awaitable; its
//! [`PromiseControls`] live in the [`PromiseRegistry`] until settlement.
//!
//! Identity is an explicit generation counter ([`PromiseId`]) rather than
//! object identity, so snapshots can tell "same episode" from "renewed
//! episode" with a plain comparison.

mod registry;

pub use registry::PromiseRegistry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::error::ResourceError;

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one episode promise, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        PromiseId(NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Settlement<T> = Result<T, ResourceError>;

/// A promise tracking one suspension episode.
///
/// Clones share the same identity and outcome; awaiting any of them
/// completes when the episode settles. A promise whose controls were
/// dropped without settling reports an abort, so no waiter is left
/// hanging.
#[derive(Clone)]
pub struct ResourcePromise<T: Clone> {
    id: PromiseId,
    shared: Shared<oneshot::Receiver<Settlement<T>>>,
}

impl<T: Clone> ResourcePromise<T> {
    fn new(id: PromiseId, receiver: oneshot::Receiver<Settlement<T>>) -> Self {
        ResourcePromise {
            id,
            shared: receiver.shared(),
        }
    }

    /// Promise settled with `value` up front.
    ///
    /// Used for sync-ready resources, which never need external
    /// settlement and therefore no registry entry.
    pub fn resolved(value: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(value));
        ResourcePromise::new(PromiseId::next(), rx)
    }

    /// Promise rejected with `error` up front.
    pub fn rejected(error: ResourceError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(error));
        ResourcePromise::new(PromiseId::next(), rx)
    }

    /// Identity of this promise. Stable across clones and snapshot
    /// copies; changes only on renewal.
    pub fn id(&self) -> PromiseId {
        self.id
    }

    /// Wait for the episode to settle.
    pub async fn wait(&self) -> Result<T, ResourceError> {
        match self.shared.clone().await {
            Ok(settlement) => settlement,
            // Controls dropped without settling: the episode was
            // abandoned, report it as an abort.
            Err(oneshot::Canceled) => Err(ResourceError::Aborted),
        }
    }
}

impl<T: Clone> fmt::Debug for ResourcePromise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePromise")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Capability pair for settling one outstanding promise.
///
/// Consumed on use, so a promise can settle at most once; "already
/// settled" is unrepresentable.
pub struct PromiseControls<T: Clone> {
    tx: oneshot::Sender<Settlement<T>>,
}

impl<T: Clone> PromiseControls<T> {
    /// Settle the promise with a value.
    pub fn resolve(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Settle the promise with an error.
    pub fn reject(self, error: ResourceError) {
        let _ = self.tx.send(Err(error));
    }
}

impl<T: Clone> fmt::Debug for PromiseControls<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseControls").finish_non_exhaustive()
    }
}

/// Create an outstanding promise together with its controls.
pub fn promise_pair<T: Clone>() -> (ResourcePromise<T>, PromiseControls<T>) {
    let (tx, rx) = oneshot::channel();
    let promise = ResourcePromise::new(PromiseId::next(), rx);
    (promise, PromiseControls { tx })
}
