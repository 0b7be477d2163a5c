//! Authentication module for managing the Blink session and its persistence.
//!
//! This module provides:
//! - `SessionManager`: login, 2FA completion, refresh and re-login
//! - `CredentialStore`: the JSON file the session is persisted to
//!
//! The session survives process restarts through the credential file, so
//! the emailed pin only has to be entered once.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::{CredentialStore, SessionStore};
pub use error::{AuthError, RefreshError};
pub use session::{LoginStatus, PinStatus, SessionManager, SessionStatus};
