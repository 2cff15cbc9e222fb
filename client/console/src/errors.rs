//! Console error types.

use remote_resource::{FetchError, Role};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// The server accepted the request but reported that nothing happened.
    #[error("{0}")]
    Rejected(String),

    #[error("You must be signed in to do that")]
    NotSignedIn,

    #[error("This action is only available to {expected} accounts (signed in as {actual})")]
    WrongRole { expected: Role, actual: Role },
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
