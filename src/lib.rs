//! Suspense-style async resource state machine.
//!
//! A [`Resource`] is an immutable snapshot of an asynchronous value's
//! lifecycle: `unresolved`, `pending`, `ready`, `refreshing` or
//! `errored`. Alongside its fields every snapshot carries a
//! [`ResourcePromise`] — one long-lived promise per suspension episode,
//! renewed only on the transitions where a new episode begins, so that
//! every consumer suspended on the same episode observes the same
//! settlement exactly once.
//!
//! The transition engine ([`next_resource`]) and the dispatch protocol
//! ([`resource_reducer`]) are pure apart from promise settlement through
//! a [`PromiseRegistry`]; [`ResourceCell`] binds them to a Tokio runtime
//! for actual fetching.
//!
//! ```
//! use async_resource::{resource_reducer, PromiseRegistry, Resource, ResourceAction, ResourceState};
//!
//! let registry = PromiseRegistry::new();
//! let resource = Resource::<String>::unresolved(&registry);
//! assert_eq!(resource.state(), ResourceState::Unresolved);
//!
//! let resource = resource_reducer(&resource, ResourceAction::Pend, &registry);
//! assert_eq!(resource.state(), ResourceState::Pending);
//!
//! let resource = resource_reducer(&resource, ResourceAction::Resolve("hello".into()), &registry);
//! assert_eq!(resource.state(), ResourceState::Ready);
//! assert_eq!(resource.data(), Some(&"hello".to_string()));
//! ```

pub mod cell;
pub mod error;
pub mod promise;
pub mod resource;

pub use cell::ResourceCell;
pub use error::ResourceError;
pub use promise::{PromiseControls, PromiseId, PromiseRegistry, ResourcePromise};
pub use resource::{
    next_resource, resource_reducer, Resource, ResourceAction, ResourcePatch, ResourceRead,
    ResourceState,
};
