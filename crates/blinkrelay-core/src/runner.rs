//! The three run modes: interactive setup, a single poll, and the daemon.
//!
//! Each mode builds its own session: setup from fresh credentials (or a
//! pending 2FA challenge), the others from the credential store.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::api::CameraCloud;
use crate::auth::{LoginStatus, PinStatus, SessionManager, SessionStatus, SessionStore};
use crate::config::{Config, Credentials};
use crate::poller::{CaptureChance, CycleReport, Poller, RandomChance};
use crate::storage::{ObjectStore, SnapshotRelay, SupabaseStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Ready { cameras: usize },
    /// A pin was emailed; rerun with `--setup --pin`.
    AwaitingPin,
    /// The pin was wrong; the challenge is still pending.
    PinRejected,
}

/// First-time authentication, including 2FA.
///
/// With a pin and a pending challenge in the store, the challenge is resumed
/// instead of logging in again (which would send a new pin).
pub async fn run_setup<C, St>(
    cloud: C,
    credentials: Credentials,
    store: &St,
    pin: Option<&str>,
) -> Result<SetupOutcome>
where
    C: CameraCloud,
    St: SessionStore + ?Sized,
{
    info!("=== Blink 2FA Setup ===");

    let stored = match store.load() {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable credential file");
            None
        }
    };

    let mut manager = match stored {
        Some(stored) if stored.awaiting_two_factor && pin.is_some() => {
            info!("Resuming pending 2FA challenge");
            SessionManager::from_stored(cloud, credentials, stored)
        }
        Some(stored) => {
            let unique_id = stored.session.unique_id;
            let mut manager = SessionManager::new(cloud, credentials).with_unique_id(unique_id);
            login_for_setup(&mut manager, store).await?;
            manager
        }
        None => {
            let mut manager = SessionManager::new(cloud, credentials);
            login_for_setup(&mut manager, store).await?;
            manager
        }
    };

    if manager.status() == SessionStatus::AwaitingTwoFactor {
        let Some(pin) = pin else {
            info!("2FA code has been sent to your email/phone.");
            info!("Run again with: blinkrelay --setup --pin YOUR_PIN");
            return Ok(SetupOutcome::AwaitingPin);
        };

        info!("Submitting 2FA pin...");
        match manager.complete_two_factor(pin).await? {
            PinStatus::Ready => {}
            PinStatus::Rejected => {
                error!("2FA verification failed. Check the PIN and try again.");
                return Ok(SetupOutcome::PinRejected);
            }
        }
    }

    manager.persist(store)?;
    info!("Credentials saved to {}", store.location());

    let cameras = match manager.refresh().await {
        Ok(devices) => {
            for device in &devices {
                info!(kind = device.kind.as_str(), "Camera: {}", device.name);
            }
            devices.len()
        }
        Err(e) => {
            warn!(error = %e, "Could not list cameras");
            0
        }
    };

    info!("Setup complete! Run without --setup for daemon mode.");
    Ok(SetupOutcome::Ready { cameras })
}

/// Log in and persist straight away, so a pending challenge survives to the
/// next invocation.
async fn login_for_setup<C, St>(manager: &mut SessionManager<C>, store: &St) -> Result<()>
where
    C: CameraCloud,
    St: SessionStore + ?Sized,
{
    let status = match manager.login().await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(e.into());
        }
    };
    if status == LoginStatus::TwoFactorRequired {
        manager.persist(store)?;
    }
    Ok(())
}

/// Restore the saved session and wire up the production relay.
pub fn build_poller<C, St>(
    cloud: C,
    config: &Config,
    store: &St,
) -> Result<Poller<C, SupabaseStorage, RandomChance>>
where
    C: CameraCloud,
    St: SessionStore + ?Sized,
{
    let session = SessionManager::restore(cloud, config.credentials.clone(), store)?;
    let relay = SnapshotRelay::from_config(SupabaseStorage::from_config(config)?, config);
    Ok(Poller::new(
        session,
        relay,
        RandomChance::new(config.capture_probability),
    ))
}

/// Exactly one cycle and one persist. Only startup failures are errors.
pub async fn run_once<C, S, R, St>(poller: &mut Poller<C, S, R>, store: &St) -> Result<CycleReport>
where
    C: CameraCloud,
    S: ObjectStore,
    R: CaptureChance,
    St: SessionStore + ?Sized,
{
    poller.session_mut().start().await?;

    let report = poller.run_cycle().await;
    debug!(?report, "Cycle complete");

    if let Err(e) = poller.session_mut().persist(store) {
        warn!(error = %e, "Failed to save session");
    }
    Ok(report)
}

/// Poll forever. Returns only when startup fails.
pub async fn run_daemon<C, S, R, St>(
    poller: &mut Poller<C, S, R>,
    store: &St,
    interval: Duration,
) -> Result<()>
where
    C: CameraCloud,
    S: ObjectStore,
    R: CaptureChance,
    St: SessionStore + ?Sized,
{
    poller.session_mut().start().await?;

    loop {
        let report = poller.run_cycle().await;
        debug!(?report, "Cycle complete");

        if poller.session().is_dirty() {
            match poller.session_mut().persist(store) {
                Ok(()) => debug!("Session saved"),
                Err(e) => warn!(error = %e, "Failed to save session"),
            }
        }

        tokio::time::sleep(interval).await;
    }
}
