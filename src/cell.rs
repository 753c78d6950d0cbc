//! Tokio-side orchestration of a resource's fetch lifecycle.
//!
//! Snapshot transitions stay pure; everything impure lives here: owning
//! the registry and the current snapshot, spawning fetch tasks,
//! dispatching protocol actions, guarding against stale completions and
//! aborting superseded fetches.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::promise::PromiseRegistry;
use crate::resource::{resource_reducer, Resource, ResourceAction};

/// Owns a resource's registry and current snapshot and drives the
/// dispatch protocol from spawned fetch tasks.
///
/// Each `fetch`/`refetch`/`mutate` starts a new fetch generation and
/// aborts the previous in-flight task. A completion dispatched under a
/// stale generation is dropped, so a late result can never overwrite a
/// newer episode — the engine itself trusts its caller to sequence
/// patches, and this is that caller.
pub struct ResourceCell<T: Clone> {
    inner: Arc<CellInner<T>>,
}

struct CellInner<T: Clone> {
    registry: PromiseRegistry<T>,
    snapshot: watch::Sender<Resource<T>>,
    /// Bumped on every fetch/refetch/mutate.
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl<T> ResourceCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Cell starting in the unresolved state.
    pub fn new() -> Self {
        Self::with_value(None)
    }

    /// Cell starting ready with `value`.
    pub fn with_initial(value: T) -> Self {
        Self::with_value(Some(value))
    }

    fn with_value(initial: Option<T>) -> Self {
        let registry = PromiseRegistry::new();
        let (snapshot, _) = watch::channel(Resource::new(initial, &registry));
        ResourceCell {
            inner: Arc::new(CellInner {
                registry,
                snapshot,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Resource<T> {
        self.inner.snapshot.borrow().clone()
    }

    /// Receiver notified on every applied dispatch.
    pub fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.inner.snapshot.subscribe()
    }

    /// Start a fetch, replacing any in-flight one.
    ///
    /// Dispatches `Pend` immediately, then `Resolve`/`Reject` from a
    /// spawned task once `fut` completes. Whether the aborted previous
    /// fetch stops doing work is up to that future; its completion is
    /// discarded either way.
    pub fn fetch<F>(&self, fut: F)
    where
        F: Future<Output = Result<T, anyhow::Error>> + Send + 'static,
    {
        let generation = self.begin();
        self.inner.dispatch(generation, ResourceAction::Pend);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let action = match fut.await {
                Ok(value) => ResourceAction::Resolve(value),
                Err(err) => ResourceAction::Reject(Some(err.into())),
            };
            inner.dispatch(generation, action);
        });
        *self.inner.in_flight.lock() = Some(handle.abort_handle());
    }

    /// Re-run the fetch for new inputs. Same contract as
    /// [`ResourceCell::fetch`]; with stale data present the resource
    /// shows `refreshing` instead of `pending`.
    pub fn refetch<F>(&self, fut: F)
    where
        F: Future<Output = Result<T, anyhow::Error>> + Send + 'static,
    {
        self.fetch(fut);
    }

    /// Install a value directly, short-circuiting any in-flight episode.
    pub fn mutate(&self, value: T) {
        let generation = self.begin();
        self.inner.dispatch(generation, ResourceAction::SyncResult(value));
    }

    /// Begin a new fetch generation, aborting the previous task.
    fn begin(&self) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.inner.in_flight.lock().take() {
            handle.abort();
        }
        generation
    }
}

impl<T> Default for ResourceCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        ResourceCell::new()
    }
}

impl<T: Clone> Drop for ResourceCell<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.in_flight.lock().take() {
            handle.abort();
        }
    }
}

impl<T: Clone> CellInner<T> {
    fn dispatch(&self, generation: u64, action: ResourceAction<T>) {
        self.snapshot.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "dropping stale dispatch");
                return false;
            }
            *current = resource_reducer(current, action, &self.registry);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceState;

    #[tokio::test]
    async fn starts_unresolved() {
        let cell = ResourceCell::<i32>::new();
        assert_eq!(cell.snapshot().state(), ResourceState::Unresolved);
    }

    #[tokio::test]
    async fn starts_ready_with_an_initial_value() {
        let cell = ResourceCell::with_initial(7);
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state(), ResourceState::Ready);
        assert_eq!(snapshot.data(), Some(&7));
    }

    #[tokio::test]
    async fn mutate_installs_the_value_synchronously() {
        let cell = ResourceCell::new();
        cell.mutate(3);
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state(), ResourceState::Ready);
        assert_eq!(snapshot.data(), Some(&3));
        assert_eq!(snapshot.promise().wait().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn fetch_dispatches_pend_then_resolve() {
        let cell = ResourceCell::new();
        cell.fetch(async { Ok(11) });
        assert_eq!(cell.snapshot().state(), ResourceState::Pending);

        let mut rx = cell.subscribe();
        let snapshot = rx
            .wait_for(|resource| resource.state() == ResourceState::Ready)
            .await
            .expect("cell dropped");
        assert_eq!(snapshot.data(), Some(&11));
    }

    #[tokio::test]
    async fn fetch_failure_dispatches_reject() {
        let cell = ResourceCell::<i32>::new();
        cell.fetch(async { Err(anyhow::anyhow!("fetch failed")) });

        let mut rx = cell.subscribe();
        let snapshot = rx
            .wait_for(|resource| resource.state() == ResourceState::Errored)
            .await
            .expect("cell dropped");
        assert_eq!(snapshot.error().unwrap().to_string(), "fetch failed");
    }
}
