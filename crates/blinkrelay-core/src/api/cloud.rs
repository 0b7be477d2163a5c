use async_trait::async_trait;

use crate::config::Credentials;
use crate::models::{Device, SessionData};

use super::ApiError;

/// Result of a password login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: SessionData,
    /// The provider emailed a pin that must be verified before the token
    /// can be used.
    pub two_factor_required: bool,
}

/// The camera-cloud capabilities the relay depends on.
///
/// `BlinkClient` talks to the real service; tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait CameraCloud: Send + Sync {
    /// Exchange credentials for a token. `unique_id` identifies this client.
    async fn login(&self, credentials: &Credentials, unique_id: &str)
        -> Result<LoginResponse, ApiError>;

    /// Submit the emailed pin. `Ok(false)` means the pin was rejected.
    async fn verify_pin(&self, session: &SessionData, pin: &str) -> Result<bool, ApiError>;

    /// Enumerate devices and fetch their current thumbnails.
    async fn list_devices(&self, session: &SessionData) -> Result<Vec<Device>, ApiError>;

    /// Ask a device to take a new thumbnail. Picked up on a later refresh.
    async fn capture_now(&self, session: &SessionData, device: &Device) -> Result<(), ApiError>;
}
