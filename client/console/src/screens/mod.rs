//! Role-based screens.
//!
//! A screen mounts the resources it shows, declares them, waits for them to
//! settle and renders through [`crate::render::section`].  Actions validate
//! input, run a mutation and name the resources it invalidates; the screen
//! then renders the refreshed state.

use std::sync::Arc;

use remote_resource::{FetchError, Resource, ResourceController, Role, SessionUser, ViewState};
use serde::de::DeserializeOwned;

use crate::errors::{ConsoleError, Result};

pub mod dashboard;
pub mod investments;
pub mod profile;
pub mod projects;
pub mod reports;
pub mod staff;
pub mod wallet;

#[cfg(test)]
pub(crate) mod fake_backend;

/// Resource ids shared between the screens that show a resource and the
/// actions that invalidate it.
pub(crate) mod ids {
    pub const APPROVED_PROJECTS: &str = "projects.approved";
    pub const OWN_PROJECTS: &str = "projects.own";
    pub const INVESTOR_HISTORY: &str = "investments.history";
    pub const RECEIVED_INVESTMENTS: &str = "investments.received";
    pub const WALLET_BALANCE: &str = "wallet.balance";
    pub const WALLET_TRANSACTIONS: &str = "wallet.transactions";
    pub const MY_REPORTS: &str = "reports.mine";
    pub const ALL_REPORTS: &str = "reports.all";
    pub const PENDING_PROJECTS: &str = "staff.pending_projects";
    pub const PENDING_PROFILES: &str = "staff.pending_profiles";
    pub const PROFILE: &str = "profile";

    pub fn project(id: &str) -> String {
        format!("project.{id}")
    }

    pub fn user(id: &str) -> String {
        format!("user.{id}")
    }
}

pub(crate) fn signed_in(controller: &ResourceController) -> Result<&SessionUser> {
    controller.session().user().ok_or(ConsoleError::NotSignedIn)
}

pub(crate) fn require_role(controller: &ResourceController, expected: Role) -> Result<&SessionUser> {
    let user = signed_in(controller)?;
    if user.role != expected {
        return Err(ConsoleError::WrongRole {
            expected,
            actual: user.role,
        });
    }
    Ok(user)
}

/// Wait for `resource` and hand back its data, or the fetch error.
pub(crate) async fn load<P>(resource: &Resource<P>) -> Result<Arc<P>>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    match resource.settled().await {
        ViewState::Success(data) => Ok(data),
        ViewState::Error(err) => Err(err.into()),
        ViewState::Idle | ViewState::Loading { .. } => Err(FetchError::network(format!(
            "{} was never requested",
            resource.id()
        ))
        .into()),
    }
}
