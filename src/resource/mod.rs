//! The resource model: lifecycle states, immutable snapshots, and the
//! transition engine that moves between them.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ reducer ──→ patch ──→ transition engine ──→ Resource
//!                                        │
//!                                        └──→ promise renewal /
//!                                             settlement (registry)
//! ```
//!
//! - **[`ResourceState`]**: classifier over the snapshot's core fields
//! - **[`Resource`]**: immutable snapshot with the suspense accessor
//! - **[`next_resource`]**: derives the next snapshot and drives the
//!   episode promise
//! - **[`resource_reducer`]**: the dispatch protocol lowered onto the
//!   engine

mod next;
mod reducer;
mod snapshot;
mod state;

pub use next::{next_resource, ResourcePatch};
pub use reducer::{resource_reducer, ResourceAction};
pub use snapshot::{Resource, ResourceRead};
pub use state::ResourceState;
