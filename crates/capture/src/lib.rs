use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::CaptureConstraints,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceAccessError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

impl From<&DeviceAccessError> for ApiError {
    fn from(value: &DeviceAccessError) -> Self {
        let code = match value {
            DeviceAccessError::PermissionDenied => ErrorCode::PermissionDenied,
            DeviceAccessError::NoDevice | DeviceAccessError::Unavailable(_) => {
                ErrorCode::DeviceUnavailable
            }
        };
        ApiError::new(code, value.to_string())
    }
}

/// A live capture stream. Dropping the handle does not release the camera;
/// callers must invoke [`CaptureStream::stop_all_tracks`].
pub trait CaptureStream: Send + Sync {
    fn constraints(&self) -> CaptureConstraints;
    fn track_count(&self) -> usize;
    fn is_live(&self) -> bool;
    fn stop_all_tracks(&self);
}

#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Suspends until the user grants or denies access.
    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Arc<dyn CaptureStream>, DeviceAccessError>;
}

pub struct MissingCaptureDevice;

#[async_trait]
impl CaptureDevice for MissingCaptureDevice {
    async fn acquire(
        &self,
        _constraints: CaptureConstraints,
    ) -> Result<Arc<dyn CaptureStream>, DeviceAccessError> {
        Err(DeviceAccessError::NoDevice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedAccess {
    Grant,
    Deny,
    NoDevice,
}

/// Camera stand-in for hosts without a real capture backend.
pub struct SimulatedCamera {
    access: SimulatedAccess,
    prompt_delay: Duration,
    acquisitions: AtomicUsize,
    live_streams: Arc<AtomicUsize>,
}

impl SimulatedCamera {
    pub fn new(access: SimulatedAccess) -> Self {
        Self {
            access,
            prompt_delay: Duration::ZERO,
            acquisitions: AtomicUsize::new(0),
            live_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulates the time a user spends on the permission prompt.
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for SimulatedCamera {
    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Arc<dyn CaptureStream>, DeviceAccessError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if !self.prompt_delay.is_zero() {
            tokio::time::sleep(self.prompt_delay).await;
        }

        match self.access {
            SimulatedAccess::Grant => {
                info!(
                    width = constraints.width,
                    height = constraints.height,
                    facing = ?constraints.facing,
                    "capture: simulated stream opened"
                );
                self.live_streams.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(SimulatedStream {
                    constraints,
                    live: AtomicBool::new(true),
                    live_streams: Arc::clone(&self.live_streams),
                }))
            }
            SimulatedAccess::Deny => Err(DeviceAccessError::PermissionDenied),
            SimulatedAccess::NoDevice => Err(DeviceAccessError::NoDevice),
        }
    }
}

struct SimulatedStream {
    constraints: CaptureConstraints,
    live: AtomicBool,
    live_streams: Arc<AtomicUsize>,
}

impl CaptureStream for SimulatedStream {
    fn constraints(&self) -> CaptureConstraints {
        self.constraints
    }

    fn track_count(&self) -> usize {
        if self.is_live() {
            1
        } else {
            0
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop_all_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.live_streams.fetch_sub(1, Ordering::SeqCst);
            debug!("capture: simulated stream stopped");
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
