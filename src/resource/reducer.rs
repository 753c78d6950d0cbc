//! The dispatch protocol driven by a fetch orchestrator.
//!
//! An orchestrator feeds the engine a strictly sequential action stream,
//! `Pend` followed by `Resolve`/`Reject`, or `SyncResult` for a value
//! that is available immediately. The reducer lowers each action to a
//! field patch; everything else (renewal, settlement) is the transition
//! engine's job.

use crate::error::ResourceError;
use crate::promise::PromiseRegistry;

use super::next::{next_resource, ResourcePatch};
use super::snapshot::Resource;

/// One step of the fetch protocol.
#[derive(Debug)]
pub enum ResourceAction<T> {
    /// A fetch started; stale data stays visible while it runs.
    Pend,
    /// The fetch resolved with a value.
    Resolve(T),
    /// The fetch rejected. `None` is normalized into
    /// [`ResourceError::NullishRejection`].
    Reject(Option<ResourceError>),
    /// An already-available value, bypassing the pending phase entirely.
    SyncResult(T),
}

/// Apply one protocol action to `previous`.
///
/// Pure apart from the promise side-effects performed through
/// `registry`; the caller is responsible for sequencing actions and for
/// discarding stale completions before dispatching them.
pub fn resource_reducer<T: Clone>(
    previous: &Resource<T>,
    action: ResourceAction<T>,
    registry: &PromiseRegistry<T>,
) -> Resource<T> {
    let patch = match action {
        ResourceAction::Pend => ResourcePatch {
            data: previous.data().cloned(),
            loading: true,
            error: None,
        },
        ResourceAction::Resolve(value) | ResourceAction::SyncResult(value) => ResourcePatch {
            data: Some(value),
            loading: false,
            error: None,
        },
        ResourceAction::Reject(error) => ResourcePatch {
            data: None,
            loading: false,
            error: Some(error.unwrap_or(ResourceError::NullishRejection)),
        },
    };
    next_resource(previous, patch, registry)
}
