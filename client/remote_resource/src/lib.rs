//! # remote_resource
//!
//! Client-side synchronization of server-backed resources for the Venture
//! marketplace.  Every screen of the marketplace is a thin consumer of one
//! [`ResourceController`]:
//!
//! | Concern      | API                                                        |
//! |--------------|------------------------------------------------------------|
//! | Read         | [`ResourceController::resource`] → [`Resource::declare`]   |
//! | Observe      | [`Resource::state`], [`Resource::subscribe`], [`Resource::settled`] |
//! | Write        | [`ResourceController::mutate`], [`Mutation::run`]          |
//! | Refresh      | [`ResourceController::revalidate`], [`Resource::replace_data`] |
//!
//! ## Stale-response suppression
//!
//! Each resource carries a generation counter.  Only the response to the most
//! recently issued request may change its [`ViewState`]; anything older is
//! dropped on arrival, whatever order the network delivers them in.
//!
//! ## Failures
//!
//! Nothing here panics or returns a fetch failure as an `Err` to the view:
//! every failure becomes [`ViewState::Error`] (or a [`FetchError`] from a
//! mutation) with a non-empty message.  There is no automatic retry.

mod config;
mod controller;
mod deps;
mod errors;
mod mutation;
mod resource;
mod session;
mod state;
mod transport;

#[cfg(any(test, feature = "testutils"))]
pub mod testing;

#[cfg(test)]
mod test_generation;
#[cfg(test)]
mod test_mutation;

pub use config::ClientConfig;
pub use controller::ResourceController;
pub use deps::{DepValue, Dependencies};
pub use errors::{ClientError, ErrorKind, FetchError, Result};
pub use mutation::{Mutation, MutationRequest, MutationResult};
pub use resource::{Resource, ResourceId};
pub use session::{Role, Session, SessionUser};
pub use state::{MutationState, ViewBranch, ViewState};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
