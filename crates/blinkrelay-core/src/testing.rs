//! In-memory stand-ins for the camera cloud, the object store, the session
//! store and the capture chance. Compiled for tests only.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::api::{ApiError, CameraCloud, LoginResponse};
use crate::auth::SessionStore;
use crate::config::Credentials;
use crate::models::{Device, DeviceKind, SessionData, StoredSession};
use crate::poller::CaptureChance;
use crate::storage::{ObjectStore, UploadError, UploadTarget};

pub const PASSWORD: &str = "hunter2";

pub fn session_data(token: &str) -> SessionData {
    SessionData {
        token: token.to_string(),
        account_id: 77,
        client_id: 88,
        tier: "u014".to_string(),
        unique_id: "4f1c2b9e-0000-4000-8000-000000000001".to_string(),
        email: "me@example.com".to_string(),
        created_at: Utc::now(),
    }
}

/// A camera whose thumbnail is `image_len` bytes, each byte derived from the
/// name so payloads of different devices differ.
pub fn device(name: &str, image_len: usize) -> Device {
    let fill = name.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
    Device {
        id: name.len() as u64,
        network_id: 5,
        kind: DeviceKind::Camera,
        name: name.to_string(),
        image: Some(vec![fill; image_len]),
    }
}

pub fn device_without_image(name: &str) -> Device {
    Device {
        image: None,
        ..device(name, 0)
    }
}

#[derive(Default)]
struct CloudState {
    pin: Option<String>,
    devices: Vec<Device>,
    valid_tokens: HashSet<String>,
    pending_tokens: HashSet<String>,
    issued: u32,
    logins: u32,
    pin_attempts: u32,
    list_calls: u32,
    list_failing: bool,
    unreachable: bool,
    failing_captures: HashSet<String>,
    captures: Vec<String>,
}

/// Camera cloud with token bookkeeping. Clones share state.
#[derive(Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<CloudState>>,
}

impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap()
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.state().devices = devices;
        self
    }

    pub fn with_two_factor(self, pin: &str) -> Self {
        self.require_two_factor(pin);
        self
    }

    pub fn require_two_factor(&self, pin: &str) {
        self.state().pin = Some(pin.to_string());
    }

    pub fn set_list_failing(&self, failing: bool) {
        self.state().list_failing = failing;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    pub fn fail_capture_for(&self, name: &str) {
        self.state().failing_captures.insert(name.to_string());
    }

    /// Invalidate every issued token, as the provider does on expiry.
    pub fn expire_tokens(&self) {
        let mut state = self.state();
        state.valid_tokens.clear();
        state.pending_tokens.clear();
    }

    /// Mark a token as usable, e.g. one restored from a file.
    pub fn accept_token(&self, token: &str) {
        self.state().valid_tokens.insert(token.to_string());
    }

    pub fn logins(&self) -> u32 {
        self.state().logins
    }

    pub fn pin_attempts(&self) -> u32 {
        self.state().pin_attempts
    }

    pub fn list_calls(&self) -> u32 {
        self.state().list_calls
    }

    pub fn captures(&self) -> Vec<String> {
        self.state().captures.clone()
    }
}

#[async_trait]
impl CameraCloud for MockCloud {
    async fn login(
        &self,
        credentials: &Credentials,
        unique_id: &str,
    ) -> Result<LoginResponse, ApiError> {
        let mut state = self.state();
        if state.unreachable {
            return Err(ApiError::ServerError("unreachable".to_string()));
        }
        state.logins += 1;
        if credentials.password != PASSWORD {
            return Err(ApiError::Unauthorized);
        }

        state.issued += 1;
        let token = format!("token-{}", state.issued);
        let two_factor_required = state.pin.is_some();
        if two_factor_required {
            state.pending_tokens.insert(token.clone());
        } else {
            state.valid_tokens.insert(token.clone());
        }

        let mut session = session_data(&token);
        session.unique_id = unique_id.to_string();
        session.email = credentials.email.clone();
        Ok(LoginResponse {
            session,
            two_factor_required,
        })
    }

    async fn verify_pin(&self, session: &SessionData, pin: &str) -> Result<bool, ApiError> {
        let mut state = self.state();
        state.pin_attempts += 1;
        let correct = state.pin.as_deref() == Some(pin);
        if correct && state.pending_tokens.remove(&session.token) {
            state.valid_tokens.insert(session.token.clone());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list_devices(&self, session: &SessionData) -> Result<Vec<Device>, ApiError> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.list_failing {
            return Err(ApiError::ServerError("homescreen unavailable".to_string()));
        }
        if !state.valid_tokens.contains(&session.token) {
            return Err(ApiError::Unauthorized);
        }
        Ok(state.devices.clone())
    }

    async fn capture_now(&self, _session: &SessionData, device: &Device) -> Result<(), ApiError> {
        let mut state = self.state();
        state.captures.push(device.name.clone());
        if state.failing_captures.contains(&device.name) {
            return Err(ApiError::ServerError("camera busy".to_string()));
        }
        Ok(())
    }
}

/// Session store that keeps the last saved value and counts saves.
#[derive(Default)]
pub struct MemoryStore {
    stored: Mutex<Option<StoredSession>>,
    saves: Mutex<u32>,
}

impl MemoryStore {
    pub fn with(stored: StoredSession) -> Self {
        Self {
            stored: Mutex::new(Some(stored)),
            saves: Mutex::new(0),
        }
    }

    pub fn stored(&self) -> Option<StoredSession> {
        self.stored.lock().unwrap().clone()
    }

    pub fn saves(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.stored())
    }

    fn save(&self, stored: &StoredSession) -> Result<()> {
        *self.stored.lock().unwrap() = Some(stored.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Object store that records every put and can fail chosen paths.
#[derive(Default)]
pub struct RecordingStore {
    puts: Mutex<Vec<(UploadTarget, Vec<u8>, String)>>,
    failing_paths: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn fail_path(&self, path: &str) {
        self.failing_paths.lock().unwrap().insert(path.to_string());
    }

    pub fn puts(&self) -> Vec<(UploadTarget, Vec<u8>, String)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.puts().into_iter().map(|(t, _, _)| t.path).collect()
    }

    pub fn payload(&self, path: &str) -> Option<Vec<u8>> {
        self.puts()
            .into_iter()
            .find(|(t, _, _)| t.path == path)
            .map(|(_, bytes, _)| bytes)
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        target: &UploadTarget,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), UploadError> {
        self.puts
            .lock()
            .unwrap()
            .push((target.clone(), bytes.to_vec(), content_type.to_string()));
        if self.failing_paths.lock().unwrap().contains(&target.path) {
            return Err(UploadError::Status {
                status: 500,
                body: "storage unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Capture chance that replays a fixed script, then never fires.
#[derive(Default)]
pub struct ScriptedChance {
    script: VecDeque<bool>,
}

impl ScriptedChance {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn never() -> Self {
        Self::default()
    }
}

impl CaptureChance for ScriptedChance {
    fn should_capture(&mut self) -> bool {
        self.script.pop_front().unwrap_or(false)
    }
}
