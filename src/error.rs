//! Error taxonomy for the resource lifecycle.
//!
//! Transitions never fail: every error condition is represented as data
//! (the snapshot's `error` field) or as a controlled promise rejection.
//! This enum covers all of them.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors carried by a resource snapshot or its episode promise.
#[derive(Clone, Error)]
pub enum ResourceError {
    /// Rejection reason supplied by the fetch, propagated verbatim.
    #[error("{0}")]
    Application(Arc<anyhow::Error>),

    /// A rejection was dispatched without a reason.
    ///
    /// A snapshot in the errored state must hold a defined error, or the
    /// classifier could not tell it apart from other states, so nullish
    /// rejections are normalized into this variant.
    #[error("resource rejected with a nullish error")]
    NullishRejection,

    /// A pending episode was abandoned before it settled naturally.
    ///
    /// Consumers suspended on the abandoned promise receive this instead
    /// of hanging forever. Check [`ResourceError::is_abort`] to tell it
    /// apart from a genuine fetch failure.
    #[error("the operation was aborted")]
    Aborted,

    /// A loading snapshot lost its episode promise.
    ///
    /// Surfaced through a pre-rejected promise rather than a panic, so a
    /// suspending reader of a broken snapshot still gets a controlled
    /// failure.
    #[error("incorrect resource state")]
    InvalidState,
}

impl ResourceError {
    /// Wrap a fetch rejection.
    pub fn application(err: impl Into<anyhow::Error>) -> Self {
        ResourceError::Application(Arc::new(err.into()))
    }

    /// Build an application error from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        ResourceError::Application(Arc::new(anyhow::Error::msg(message)))
    }

    /// Was this episode cancelled rather than genuinely failed?
    pub fn is_abort(&self) -> bool {
        matches!(self, ResourceError::Aborted)
    }
}

impl From<anyhow::Error> for ResourceError {
    fn from(err: anyhow::Error) -> Self {
        ResourceError::Application(Arc::new(err))
    }
}

impl fmt::Debug for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Application(err) => write!(f, "Application({err:?})"),
            ResourceError::NullishRejection => f.write_str("NullishRejection"),
            ResourceError::Aborted => f.write_str("Aborted"),
            ResourceError::InvalidState => f.write_str("InvalidState"),
        }
    }
}
