//! Read and write status envelopes exposed to views.
//!
//! ```text
//! Idle ──► Loading ──► Success
//!             ▲   └──► Error
//!             └─────────┘  (re-declare / revalidate)
//! ```
//!
//! `Loading` may carry the previous success payload as `stale` so a view can
//! keep it on screen while the new request runs.  Stale data is never reported
//! through [`ViewState::data`].

use std::sync::Arc;

use crate::errors::FetchError;

#[derive(Debug)]
pub enum ViewState<P> {
    Idle,
    Loading { stale: Option<Arc<P>> },
    Success(Arc<P>),
    Error(FetchError),
}

// Manual impls: `P` itself need not be `Clone`/`PartialEq`-derivable through `Arc`.
impl<P> Clone for ViewState<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading { stale } => Self::Loading {
                stale: stale.clone(),
            },
            Self::Success(data) => Self::Success(Arc::clone(data)),
            Self::Error(err) => Self::Error(err.clone()),
        }
    }
}

impl<P: PartialEq> PartialEq for ViewState<P> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle) => true,
            (Self::Loading { stale: a }, Self::Loading { stale: b }) => a == b,
            (Self::Success(a), Self::Success(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl<P> Default for ViewState<P> {
    fn default() -> Self {
        Self::Idle
    }
}

/// Which branch a view should render for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewBranch {
    Idle,
    Loading,
    Error,
    Empty,
    Data,
}

impl<P> ViewState<P> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// `true` once the current request has produced a result.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    /// Current data, only when the latest request succeeded.
    pub fn data(&self) -> Option<&P> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Data from a previous success that is being refreshed.
    pub fn stale_data(&self) -> Option<&P> {
        match self {
            Self::Loading { stale } => stale.as_deref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Payload to carry into the next `Loading` state.
    pub(crate) fn carry_forward(&self) -> Option<Arc<P>> {
        match self {
            Self::Success(data) => Some(Arc::clone(data)),
            Self::Loading { stale } => stale.clone(),
            Self::Idle | Self::Error(_) => None,
        }
    }

    /// Pick the branch to render.  `is_empty` decides whether a successful
    /// payload counts as "no data".
    pub fn branch(&self, is_empty: impl FnOnce(&P) -> bool) -> ViewBranch {
        match self {
            Self::Idle => ViewBranch::Idle,
            Self::Loading { .. } => ViewBranch::Loading,
            Self::Error(_) => ViewBranch::Error,
            Self::Success(data) if is_empty(data) => ViewBranch::Empty,
            Self::Success(_) => ViewBranch::Data,
        }
    }
}

/// Status of a one-shot write, independent of any resource's read state.
#[derive(Debug)]
pub enum MutationState<R> {
    Idle,
    Pending,
    Success(Arc<R>),
    Error(FetchError),
}

impl<R> Clone for MutationState<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Pending => Self::Pending,
            Self::Success(data) => Self::Success(Arc::clone(data)),
            Self::Error(err) => Self::Error(err.clone()),
        }
    }
}

impl<R> Default for MutationState<R> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<R> MutationState<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}
