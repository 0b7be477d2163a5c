use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token material returned by the Blink login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub account_id: u64,
    pub client_id: u64,
    /// Regional shard, e.g. `u014`. Selects the REST host.
    pub tier: String,
    /// Client identifier sent on every login so Blink recognises this host
    pub unique_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    /// Base URL of the regional REST host for this account
    pub fn host(&self) -> String {
        format!("https://rest-{}.immedia-semi.com", self.tier)
    }
}

/// What the credential file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub session: SessionData,
    /// Login succeeded but the emailed pin has not been verified yet
    #[serde(default)]
    pub awaiting_two_factor: bool,
}

/// Generate a client identifier in UUID v4 textual form.
pub fn new_unique_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
