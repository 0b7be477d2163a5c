//! API client for communicating with the Blink cloud REST API.
//!
//! This module provides the `BlinkClient` struct, the production
//! implementation of `CameraCloud`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::models::{Device, DeviceKind, Homescreen, SessionData};

use super::{ApiError, CameraCloud, LoginResponse};

// ============================================================================
// Constants
// ============================================================================

/// Login is always sent to the prod host; the response names the regional tier.
const LOGIN_URL: &str = "https://rest-prod.immedia-semi.com/api/v5/account/login";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the session token on authenticated requests
const TOKEN_HEADER: header::HeaderName = header::HeaderName::from_static("token_auth");

const USER_AGENT: &str = concat!("blinkrelay/", env!("CARGO_PKG_VERSION"));

const CLIENT_NAME: &str = "blinkrelay";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    unique_id: &'a str,
    client_name: &'a str,
    device_identifier: &'a str,
    reauth: bool,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    account: AuthAccount,
    auth: AuthToken,
}

#[derive(Debug, Deserialize)]
struct AuthAccount {
    account_id: u64,
    client_id: u64,
    #[serde(default)]
    client_verification_required: bool,
    #[serde(default)]
    account_verification_required: bool,
    tier: String,
}

#[derive(Debug, Deserialize)]
struct AuthToken {
    token: String,
}

#[derive(Debug, Serialize)]
struct PinRequest<'a> {
    pin: &'a str,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Blink cloud client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct BlinkClient {
    client: Client,
}

impl BlinkClient {
    /// Create a new API client
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    fn auth_headers(session: &SessionData) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&session.token)
            .map_err(|_| ApiError::InvalidResponse("token is not a valid header value".into()))?;
        headers.insert(TOKEN_HEADER, value);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, session: &SessionData, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .headers(Self::auth_headers(session)?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn get_bytes(&self, session: &SessionData, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(url)
            .headers(Self::auth_headers(session)?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Full URL of a thumbnail path from the homescreen response.
    /// Older camera thumbnails omit the extension; newer ones carry a query.
    fn thumbnail_url(host: &str, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.contains('?') || path.ends_with(".jpg") {
            format!("{}{}", host, path)
        } else {
            format!("{}{}.jpg", host, path)
        }
    }

    fn capture_url(session: &SessionData, device: &Device) -> String {
        let host = session.host();
        match device.kind {
            DeviceKind::Camera => format!(
                "{}/network/{}/camera/{}/thumbnail",
                host, device.network_id, device.id
            ),
            DeviceKind::Mini => format!(
                "{}/api/v1/accounts/{}/networks/{}/owls/{}/thumbnail",
                host, session.account_id, device.network_id, device.id
            ),
            DeviceKind::Doorbell => format!(
                "{}/api/v1/accounts/{}/networks/{}/doorbells/{}/thumbnail",
                host, session.account_id, device.network_id, device.id
            ),
        }
    }
}

#[async_trait]
impl CameraCloud for BlinkClient {
    async fn login(
        &self,
        credentials: &Credentials,
        unique_id: &str,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            unique_id,
            client_name: CLIENT_NAME,
            device_identifier: CLIENT_NAME,
            reauth: true,
        };

        let response = self.client.post(LOGIN_URL).json(&body).send().await?;
        let response = Self::check_response(response).await?;
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("login: {}", e)))?;

        debug!(
            account_id = auth.account.account_id,
            tier = %auth.account.tier,
            "Login response received"
        );

        Ok(LoginResponse {
            two_factor_required: auth.account.client_verification_required
                || auth.account.account_verification_required,
            session: SessionData {
                token: auth.auth.token,
                account_id: auth.account.account_id,
                client_id: auth.account.client_id,
                tier: auth.account.tier,
                unique_id: unique_id.to_string(),
                email: credentials.email.clone(),
                created_at: Utc::now(),
            },
        })
    }

    async fn verify_pin(&self, session: &SessionData, pin: &str) -> Result<bool, ApiError> {
        let url = format!(
            "{}/api/v4/account/{}/client/{}/pin/verify",
            session.host(),
            session.account_id,
            session.client_id
        );

        let response = self
            .client
            .post(&url)
            .headers(Self::auth_headers(session)?)
            .json(&PinRequest { pin })
            .send()
            .await?;

        // A wrong pin comes back as a 4xx with a JSON body rather than valid=false
        let status = response.status();
        if status.is_client_error() && status != reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %ApiError::truncate_body(&body), "Pin rejected");
            return Ok(false);
        }

        let response = Self::check_response(response).await?;
        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("pin verify: {}", e)))?;

        if !parsed.valid {
            warn!(message = ?parsed.message, "Pin rejected");
        }
        Ok(parsed.valid)
    }

    async fn list_devices(&self, session: &SessionData) -> Result<Vec<Device>, ApiError> {
        let host = session.host();
        let url = format!("{}/api/v3/accounts/{}/homescreen", host, session.account_id);
        let home: Homescreen = self.get(session, &url).await?;

        let mut devices = Vec::new();
        for (kind, entry) in home.entries() {
            let image = match entry.thumbnail.as_deref() {
                Some(path) if !path.is_empty() => {
                    let thumb_url = Self::thumbnail_url(&host, path);
                    match self.get_bytes(session, &thumb_url).await {
                        Ok(bytes) => Some(bytes),
                        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                        Err(e) => {
                            warn!(camera = %entry.name, error = %e, "Thumbnail download failed");
                            None
                        }
                    }
                }
                _ => None,
            };

            devices.push(Device {
                id: entry.id,
                network_id: entry.network_id,
                kind,
                name: entry.name.clone(),
                image,
            });
        }

        debug!(count = devices.len(), "Devices enumerated");
        Ok(devices)
    }

    async fn capture_now(&self, session: &SessionData, device: &Device) -> Result<(), ApiError> {
        let url = Self::capture_url(session, device);
        let response = self
            .client
            .post(&url)
            .headers(Self::auth_headers(session)?)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }
}
