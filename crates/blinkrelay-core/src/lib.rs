//! blinkrelay core - polls Blink camera thumbnails and republishes them to
//! Supabase Storage.
//!
//! The binary crate only handles the process edges (logging, `.env`, CLI,
//! exit codes); everything with behaviour lives here.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod poller;
pub mod runner;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, BlinkClient, CameraCloud};
pub use auth::{AuthError, CredentialStore, SessionManager, SessionStatus, SessionStore};
pub use config::{Config, ConfigError, Credentials};
pub use poller::{CycleReport, Poller, RandomChance};
pub use runner::{build_poller, run_daemon, run_once, run_setup, SetupOutcome};
pub use storage::{SnapshotRelay, SupabaseStorage};
