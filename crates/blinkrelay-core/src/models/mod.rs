//! Data models for Blink devices and session material.
//!
//! - `Device`, `DeviceKind`: cameras enumerated on each refresh
//! - `Homescreen`: the slice of the homescreen response the relay reads
//! - `SessionData`, `StoredSession`: token material and its on-disk form

pub mod device;
pub mod session;

pub use device::{Device, DeviceKind, Homescreen, HomescreenDevice, MIN_IMAGE_BYTES};
pub use session::{new_unique_id, SessionData, StoredSession};
