//! Signing in.
//!
//! The login response sets a session cookie in the transport's cookie store;
//! the returned controller shares that transport and carries the user as its
//! [`Session`].

use remote_resource::{MutationRequest, ResourceController, Session};
use tracing::info;

use crate::api::{self, AccountUser, Credentials, LoginResponse};
use crate::errors::{ConsoleError, Result};

pub async fn login(
    anonymous: &ResourceController,
    credentials: &Credentials,
) -> Result<(ResourceController, AccountUser)> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ConsoleError::validation(
            "Please enter your email and password",
        ));
    }

    let request = MutationRequest::post(api::LOGIN).json(credentials)?;
    let LoginResponse { user } = anonymous.mutate(request, &[]).await?;
    info!(email = %user.identity.email, role = %user.identity.role, "signed in");

    let controller = anonymous.with_session(Session::signed_in(user.identity.clone()));
    Ok((controller, user))
}
