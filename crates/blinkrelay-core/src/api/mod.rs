//! REST API client module for the Blink camera cloud.
//!
//! This module provides the `CameraCloud` capability trait and
//! `BlinkClient`, its implementation against the Blink REST API.
//!
//! The API uses a token obtained from the password login endpoint, which
//! may require an emailed pin to be verified before the token is usable.

pub mod client;
pub mod cloud;
pub mod error;

pub use client::BlinkClient;
pub use cloud::{CameraCloud, LoginResponse};
pub use error::ApiError;
