use thiserror::Error;

use crate::api::ApiError;

use super::SessionStatus;

/// Failures that stop setup or startup.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login rejected: {0}")]
    Rejected(ApiError),

    #[error("Could not reach Blink: {0}")]
    Network(ApiError),

    #[error("2FA required. Run with --setup first.")]
    TwoFactorRequired,

    #[error("No saved credentials at {0}. Run with --setup first.")]
    NoSavedSession(String),

    #[error("No 2FA challenge is pending")]
    NotAwaitingTwoFactor,

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    /// Classify a login-time API failure. Transport and provider failures are
    /// kept apart from credential refusals so the log says which happened.
    pub fn from_login(err: ApiError) -> Self {
        if err.is_transient() {
            AuthError::Network(err)
        } else {
            AuthError::Rejected(err)
        }
    }
}

/// A refresh that failed. Never fatal inside the poll loop.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Session is {0}")]
    NotReady(SessionStatus),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Re-login failed: {0}")]
    Relogin(#[from] AuthError),
}
