//! Resource lifecycle states and the field classifier.

use std::fmt;

/// Name of a resource lifecycle state.
///
/// | state      | data  | loading | error |
/// |:-----------|:-----:|:-------:|:-----:|
/// | unresolved | No    | No      | No    |
/// | pending    | No    | Yes     | No*   |
/// | ready      | Yes   | No      | No    |
/// | refreshing | Yes   | Yes     | No*   |
/// | errored    | No*   | No      | Yes   |
///
/// Fields marked with * are expected to hold the given value, but are
/// ignored by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Nothing requested yet.
    Unresolved,
    /// First episode in flight, no previous data to show.
    Pending,
    /// Current episode resolved with data.
    Ready,
    /// New episode in flight while stale data is still visible.
    Refreshing,
    /// Current episode rejected.
    Errored,
}

impl ResourceState {
    /// Classify a snapshot's fields into a state name.
    ///
    /// Precedence matters: `loading` wins over a stale `error`, and
    /// `error` wins over a stale `data`. A patch carrying both a defined
    /// `data` and `error` alongside `loading` is unusual but allowed, and
    /// lands on `Refreshing`.
    pub fn classify(data_defined: bool, loading: bool, error_defined: bool) -> Self {
        if data_defined && loading {
            return ResourceState::Refreshing;
        }
        if loading {
            return ResourceState::Pending;
        }
        if error_defined {
            return ResourceState::Errored;
        }
        if data_defined {
            return ResourceState::Ready;
        }
        ResourceState::Unresolved
    }

    /// Lowercase state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Unresolved => "unresolved",
            ResourceState::Pending => "pending",
            ResourceState::Ready => "ready",
            ResourceState::Refreshing => "refreshing",
            ResourceState::Errored => "errored",
        }
    }

    /// Is an episode currently outstanding?
    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Pending | ResourceState::Refreshing)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
