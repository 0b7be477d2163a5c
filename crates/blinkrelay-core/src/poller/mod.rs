//! Poll loop: one refresh, relay every thumbnail, occasionally ask the
//! cameras for new ones.
//!
//! Everything inside a cycle is sequential. Uploads go out one at a time in
//! enumeration order, and a failure only affects the image it belongs to.

pub mod chance;

use tracing::{error, info, warn};

use crate::api::CameraCloud;
use crate::auth::SessionManager;
use crate::storage::{ObjectStore, SnapshotRelay};

pub use chance::{CaptureChance, RandomChance};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub devices: usize,
    pub uploaded: usize,
    pub failed_uploads: usize,
    /// Devices without a usable thumbnail
    pub skipped: usize,
    pub refresh_failed: bool,
    pub capture_requested: bool,
}

pub struct Poller<C, S, R = RandomChance> {
    session: SessionManager<C>,
    relay: SnapshotRelay<S>,
    chance: R,
}

impl<C, S, R> Poller<C, S, R>
where
    C: CameraCloud,
    S: ObjectStore,
    R: CaptureChance,
{
    pub fn new(session: SessionManager<C>, relay: SnapshotRelay<S>, chance: R) -> Self {
        Self {
            session,
            relay,
            chance,
        }
    }

    pub fn session(&self) -> &SessionManager<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager<C> {
        &mut self.session
    }

    pub fn relay(&self) -> &SnapshotRelay<S> {
        &self.relay
    }

    /// Run one cycle. Never fails: every error is logged and counted.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let devices = match self.session.refresh().await {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, "Poll error");
                report.refresh_failed = true;
                return report;
            }
        };
        report.devices = devices.len();

        for (index, device) in devices.iter().enumerate() {
            // One read per device: the alias gets the exact same bytes.
            let Some(image) = device.image_for() else {
                warn!(camera = %device.name, "No thumbnail for {}", device.name);
                report.skipped += 1;
                continue;
            };

            for target in self.relay.targets_for(index, &device.name) {
                match self.relay.upload(image, &target).await {
                    Ok(()) => report.uploaded += 1,
                    Err(_) => report.failed_uploads += 1,
                }
            }
        }

        if self.chance.should_capture() {
            report.capture_requested = true;
            for device in &devices {
                match self.session.capture_now(device).await {
                    Ok(()) => info!(camera = %device.name, "Requested new snapshot for {}", device.name),
                    Err(e) => warn!(camera = %device.name, error = %e, "Snap request failed for {}", device.name),
                }
            }
        }

        report
    }
}
