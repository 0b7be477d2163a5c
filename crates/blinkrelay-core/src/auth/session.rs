use std::fmt;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{ApiError, CameraCloud};
use crate::config::Credentials;
use crate::models::{new_unique_id, Device, SessionData, StoredSession};

use super::{AuthError, RefreshError, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    AwaitingTwoFactor,
    Ready,
    /// The last refresh failed; the next one is attempted as usual.
    Degraded,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Unauthenticated => "unauthenticated",
            SessionStatus::AwaitingTwoFactor => "awaiting 2FA",
            SessionStatus::Ready => "ready",
            SessionStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Ready,
    TwoFactorRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStatus {
    Ready,
    /// Wrong pin. The challenge is still pending and can be retried.
    Rejected,
}

/// Owns the one live Blink session of this process.
pub struct SessionManager<C> {
    cloud: C,
    credentials: Credentials,
    unique_id: String,
    session: Option<SessionData>,
    status: SessionStatus,
    /// Token changed since the last persist
    dirty: bool,
}

impl<C: CameraCloud> SessionManager<C> {
    pub fn new(cloud: C, credentials: Credentials) -> Self {
        Self {
            cloud,
            credentials,
            unique_id: new_unique_id(),
            session: None,
            status: SessionStatus::Unauthenticated,
            dirty: false,
        }
    }

    /// Reuse a client identifier from an earlier run
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    /// Rebuild a manager from persisted state. No network calls.
    pub fn from_stored(cloud: C, credentials: Credentials, stored: StoredSession) -> Self {
        let status = if stored.awaiting_two_factor {
            SessionStatus::AwaitingTwoFactor
        } else {
            SessionStatus::Ready
        };
        Self {
            cloud,
            credentials,
            unique_id: stored.session.unique_id.clone(),
            session: Some(stored.session),
            status,
            dirty: false,
        }
    }

    /// Load the persisted session. Fails when nothing was ever saved.
    pub fn restore<S: SessionStore + ?Sized>(
        cloud: C,
        credentials: Credentials,
        store: &S,
    ) -> Result<Self> {
        let stored = store
            .load()?
            .ok_or_else(|| AuthError::NoSavedSession(store.location()))?;
        Ok(Self::from_stored(cloud, credentials, stored))
    }

    /// Save the current session so a later run can resume it.
    pub fn persist<S: SessionStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        let session = self.session.clone().context("No session to persist")?;
        store.save(&StoredSession {
            session,
            awaiting_two_factor: self.status == SessionStatus::AwaitingTwoFactor,
        })?;
        self.dirty = false;
        Ok(())
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Password login. Errors other than the 2FA signal are fatal to the caller.
    pub async fn login(&mut self) -> Result<LoginStatus, AuthError> {
        let response = self
            .cloud
            .login(&self.credentials, &self.unique_id)
            .await
            .map_err(AuthError::from_login)?;

        self.session = Some(response.session);
        self.dirty = true;

        if response.two_factor_required {
            self.status = SessionStatus::AwaitingTwoFactor;
            info!("2FA is required");
            Ok(LoginStatus::TwoFactorRequired)
        } else {
            self.status = SessionStatus::Ready;
            info!("Login succeeded without 2FA");
            Ok(LoginStatus::Ready)
        }
    }

    /// Submit the emailed pin for a pending login.
    pub async fn complete_two_factor(&mut self, pin: &str) -> Result<PinStatus, AuthError> {
        if self.status != SessionStatus::AwaitingTwoFactor {
            return Err(AuthError::NotAwaitingTwoFactor);
        }
        let session = self.session.as_ref().ok_or(AuthError::NotAwaitingTwoFactor)?;

        let valid = self
            .cloud
            .verify_pin(session, pin.trim())
            .await
            .map_err(AuthError::from_login)?;

        if valid {
            self.status = SessionStatus::Ready;
            self.dirty = true;
            info!("2FA verification successful");
            Ok(PinStatus::Ready)
        } else {
            Ok(PinStatus::Rejected)
        }
    }

    /// Fetch the current device list and thumbnails.
    ///
    /// An expired token triggers one password re-login. A failure leaves the
    /// session `Degraded`; the caller is expected to try again later.
    pub async fn refresh(&mut self) -> Result<Vec<Device>, RefreshError> {
        match self.status {
            SessionStatus::Ready | SessionStatus::Degraded => {}
            other => return Err(RefreshError::NotReady(other)),
        }

        let result = self.fetch_devices().await;
        match &result {
            Ok(_) => self.status = SessionStatus::Ready,
            // A re-login that ended up waiting on a pin keeps that state so
            // later cycles don't trigger another challenge.
            Err(_) if self.status == SessionStatus::AwaitingTwoFactor => {}
            Err(_) => self.status = SessionStatus::Degraded,
        }
        result
    }

    async fn fetch_devices(&mut self) -> Result<Vec<Device>, RefreshError> {
        let session = self
            .session
            .as_ref()
            .ok_or(RefreshError::NotReady(self.status))?;

        let result = self.cloud.list_devices(session).await;
        match result {
            Ok(devices) => Ok(devices),
            Err(ApiError::Unauthorized) => {
                warn!("Session token rejected, logging in again");
                match self.login().await? {
                    LoginStatus::Ready => {}
                    LoginStatus::TwoFactorRequired => {
                        return Err(AuthError::TwoFactorRequired.into());
                    }
                }
                let session = self
                    .session
                    .as_ref()
                    .ok_or(RefreshError::NotReady(self.status))?;
                Ok(self.cloud.list_devices(session).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Startup handshake: one refresh, with every failure treated as fatal.
    pub async fn start(&mut self) -> Result<Vec<Device>, AuthError> {
        match self.refresh().await {
            Ok(devices) => {
                let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
                info!(cameras = ?names, "Authenticated. Found {} camera(s)", devices.len());
                Ok(devices)
            }
            Err(RefreshError::NotReady(SessionStatus::AwaitingTwoFactor)) => {
                Err(AuthError::TwoFactorRequired)
            }
            Err(RefreshError::NotReady(_)) => Err(AuthError::NotAuthenticated),
            Err(RefreshError::Api(e)) => Err(AuthError::from_login(e)),
            Err(RefreshError::Relogin(e)) => Err(e),
        }
    }

    /// Ask a device for a fresh thumbnail through the live session.
    pub async fn capture_now(&self, device: &Device) -> Result<(), ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::Unauthorized)?;
        self.cloud.capture_now(session, device).await
    }
}
