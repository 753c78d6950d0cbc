//! Immutable resource snapshots and the suspense accessor.

use crate::error::ResourceError;
use crate::promise::{PromiseRegistry, ResourcePromise};

use super::state::ResourceState;

/// One immutable observation of an asynchronous value's lifecycle.
///
/// Snapshots are never mutated after creation; the transition engine
/// derives a new snapshot from the previous one. Core fields (`data`,
/// `loading`, `error`) describe the current episode; `latest` and
/// `state` are derived; `promise` identifies the episode itself.
#[derive(Debug, Clone)]
pub struct Resource<T: Clone> {
    data: Option<T>,
    loading: bool,
    error: Option<ResourceError>,
    latest: Option<T>,
    state: ResourceState,
    promise: ResourcePromise<T>,
}

/// Outcome of reading a resource in a suspending context.
///
/// The three-way read replaces the callable accessor of suspense
/// frameworks: suspend on a pending handle, fail with the stored error,
/// or take the value.
#[derive(Debug)]
pub enum ResourceRead<'a, T: Clone> {
    /// An episode is in flight; await the promise and read again.
    Suspended(ResourcePromise<T>),
    /// The current episode failed.
    Failed(ResourceError),
    /// Settled value; `None` when the resource was never requested.
    Value(Option<&'a T>),
}

impl<T: Clone> Resource<T> {
    /// Resource that has not been asked for anything yet.
    ///
    /// Its promise is a pending-forever placeholder; a later transition
    /// into a loading state renews it into a real episode.
    pub fn unresolved(registry: &PromiseRegistry<T>) -> Self {
        let mut stub = ResourceStub::new(None, false, None);
        stub.promise = Some(registry.mint());
        stub.finish()
    }

    /// Resource whose first episode is already in flight.
    ///
    /// The public promise is always the registry-tracked one, never the
    /// caller's own fetch future.
    pub fn pending(registry: &PromiseRegistry<T>) -> Self {
        let mut stub = ResourceStub::new(None, true, None);
        stub.promise = Some(registry.mint());
        stub.finish()
    }

    /// Resource that is ready up front.
    ///
    /// Its promise is already resolved with the value, so it needs no
    /// registry entry.
    pub fn ready(value: T) -> Self {
        let mut stub = ResourceStub::new(Some(value.clone()), false, None);
        stub.promise = Some(ResourcePromise::resolved(value));
        stub.finish()
    }

    /// Construct from an optional initial value: `Some` starts ready,
    /// `None` starts unresolved.
    pub fn new(initial: Option<T>, registry: &PromiseRegistry<T>) -> Self {
        match initial {
            Some(value) => Resource::ready(value),
            None => Resource::unresolved(registry),
        }
    }

    /// Last known successful value for synchronous access.
    ///
    /// `None` while nothing resolved yet or after a failed episode; it
    /// never suspends. Suspending readers go through [`Resource::read`].
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Is an operation for the current episode outstanding?
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Rejection reason of the current episode, if it failed.
    pub fn error(&self) -> Option<&ResourceError> {
        self.error.as_ref()
    }

    /// Most recent successfully resolved value across episodes.
    ///
    /// Never cleared by a failed or pending episode; this is what to
    /// render while new data is loading.
    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    /// State name, always equal to the classifier's output for the
    /// current fields.
    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// The promise representing "this episode completes".
    ///
    /// Identity is stable across snapshots of the same episode and the
    /// promise settles exactly once.
    pub fn promise(&self) -> &ResourcePromise<T> {
        &self.promise
    }

    /// Suspense accessor.
    ///
    /// Loading wins over a stale error: a refresh that started clears the
    /// errored/ready distinction until it completes.
    pub fn read(&self) -> ResourceRead<'_, T> {
        if self.loading {
            return ResourceRead::Suspended(self.promise.clone());
        }
        if let Some(error) = &self.error {
            return ResourceRead::Failed(error.clone());
        }
        ResourceRead::Value(self.data.as_ref())
    }
}

/// Snapshot under construction: core fields classified, promise not yet
/// attached.
pub(super) struct ResourceStub<T: Clone> {
    pub(super) data: Option<T>,
    pub(super) loading: bool,
    pub(super) error: Option<ResourceError>,
    pub(super) latest: Option<T>,
    pub(super) state: ResourceState,
    pub(super) promise: Option<ResourcePromise<T>>,
}

impl<T: Clone> ResourceStub<T> {
    pub(super) fn new(data: Option<T>, loading: bool, error: Option<ResourceError>) -> Self {
        let state = ResourceState::classify(data.is_some(), loading, error.is_some());
        let latest = data.clone();
        ResourceStub {
            data,
            loading,
            error,
            latest,
            state,
            promise: None,
        }
    }

    /// Seal the stub into a snapshot.
    ///
    /// A loading stub that somehow lost its promise gets a pre-rejected
    /// one, so a suspended reader fails with a controlled error instead
    /// of hanging or panicking.
    pub(super) fn finish(self) -> Resource<T> {
        let promise = self
            .promise
            .unwrap_or_else(|| ResourcePromise::rejected(ResourceError::InvalidState));
        Resource {
            data: self.data,
            loading: self.loading,
            error: self.error,
            latest: self.latest,
            state: self.state,
            promise,
        }
    }
}
