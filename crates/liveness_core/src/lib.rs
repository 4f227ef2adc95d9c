use std::sync::Arc;

use capture::{CaptureDevice, CaptureStream};
use chrono::Utc;
use shared::{
    domain::{
        ControlState, HostAction, Outcome, Step, StepDescriptor, VerificationRecord, ViewportMark,
    },
    protocol::SessionEvent,
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod executor;
pub mod outcome;

pub use config::{load_settings_from, SessionSettings};
pub use error::{Result, SessionError};
pub use executor::{StepExecutor, StepOutcome, TimedStepExecutor};
pub use outcome::{decide_outcome, OutcomeSource, RandomOutcomeSource};

const EVENT_CHANNEL_CAPACITY: usize = 256;

const PROGRESS_IDLE: u8 = 0;
const PROGRESS_REQUESTING: u8 = 10;
const PROGRESS_READY: u8 = 20;
const PROGRESS_PROCESSING: u8 = 90;
const PROGRESS_DONE: u8 = 100;

const MSG_MOUNTED: &str = "Click the camera to enable access";
const MSG_REQUESTING: &str = "Requesting camera access...";
const MSG_CAMERA_READY: &str = "Camera ready! Click \"Start Verification\" to begin";
const MSG_ACCESS_DENIED: &str = "Camera access denied. Please enable camera permissions.";
const MSG_ACCESS_REQUIRED: &str = "Camera access is required for face verification. Please enable camera permissions and try again.";
const MSG_PROCESSING: &str = "Processing verification...";
const MSG_SUCCESS: &str = "Verification completed successfully!";
const MSG_FAILURE: &str = "Verification failed";
const MSG_RETRY_READY: &str = "Ready to start verification";

/// Progress reported while `step_position` (zero-based among pose steps) is active.
fn step_progress(step_position: usize) -> u8 {
    let progress = PROGRESS_READY as usize + 20 * step_position;
    progress.min(80) as u8
}

/// Read-only copy of the session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub current_step_index: usize,
    pub is_running: bool,
    pub has_device: bool,
    pub progress: u8,
    pub outcome: Option<Outcome>,
    pub active_step: Option<Step>,
    pub completed_steps: Vec<Step>,
    pub controls: ControlState,
}

struct SessionState {
    current_step_index: usize,
    is_running: bool,
    awaiting_device: bool,
    device: Option<Arc<dyn CaptureStream>>,
    progress: u8,
    outcome: Option<Outcome>,
    active_step: Option<Step>,
    completed_steps: Vec<Step>,
    controls: ControlState,
}

impl SessionState {
    fn new() -> Self {
        Self {
            current_step_index: 0,
            is_running: false,
            awaiting_device: false,
            device: None,
            progress: PROGRESS_IDLE,
            outcome: None,
            active_step: None,
            completed_steps: Vec::new(),
            controls: ControlState::INITIAL,
        }
    }
}

/// Drives the guided pose sequence for one camera viewport.
///
/// All display changes are published as [`SessionEvent`]s; the session never
/// touches the display surface itself.
pub struct VerificationSession {
    settings: SessionSettings,
    device: Arc<dyn CaptureDevice>,
    executor: Arc<dyn StepExecutor>,
    outcome_source: Mutex<Box<dyn OutcomeSource>>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl VerificationSession {
    pub fn new(device: Arc<dyn CaptureDevice>) -> Arc<Self> {
        Self::new_with_settings(SessionSettings::default(), device)
    }

    pub fn new_with_settings(
        settings: SessionSettings,
        device: Arc<dyn CaptureDevice>,
    ) -> Arc<Self> {
        Self::new_with_dependencies(
            settings,
            device,
            Arc::new(TimedStepExecutor),
            Box::new(RandomOutcomeSource::from_entropy()),
        )
    }

    pub fn new_with_dependencies(
        settings: SessionSettings,
        device: Arc<dyn CaptureDevice>,
        executor: Arc<dyn StepExecutor>,
        outcome_source: Box<dyn OutcomeSource>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            settings,
            device,
            executor,
            outcome_source: Mutex::new(outcome_source),
            state: Mutex::new(SessionState::new()),
            events,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn event_stream(&self) -> BroadcastStream<SessionEvent> {
        BroadcastStream::new(self.events.subscribe())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            current_step_index: state.current_step_index,
            is_running: state.is_running,
            has_device: state.device.is_some(),
            progress: state.progress,
            outcome: state.outcome,
            active_step: state.active_step,
            completed_steps: state.completed_steps.clone(),
            controls: state.controls,
        }
    }

    /// Publishes the initial display state once a renderer is attached.
    pub async fn mount(&self) {
        let mut state = self.state.lock().await;
        self.emit(SessionEvent::Viewport {
            mark: ViewportMark::Idle,
        });
        let index = state.current_step_index;
        self.set_active_step(&mut state, index);
        self.update_status(&mut state, MSG_MOUNTED, PROGRESS_IDLE);
        self.set_controls(&mut state, ControlState::INITIAL);
    }

    pub async fn handle_action(&self, action: HostAction) -> Result<()> {
        debug!(?action, "liveness: host action");
        match action {
            HostAction::PlaceholderClicked => self.request_device_access().await,
            HostAction::StartClicked => self.start_verification().await.map(|_| ()),
            HostAction::RetryClicked => {
                self.reset_for_retry().await;
                Ok(())
            }
            HostAction::CloseClicked => {
                self.close_result().await;
                Ok(())
            }
        }
    }

    pub async fn request_device_access(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.is_running {
                warn!("liveness: camera request ignored while verification is running");
                return Ok(());
            }
            if state.awaiting_device {
                debug!("liveness: camera request already pending");
                return Ok(());
            }
            if state.device.is_some() {
                self.update_status(&mut state, MSG_CAMERA_READY, PROGRESS_READY);
                return Ok(());
            }
            state.awaiting_device = true;
            self.update_status(&mut state, MSG_REQUESTING, PROGRESS_REQUESTING);
        }

        let acquired = self.device.acquire(self.settings.constraints).await;

        let mut state = self.state.lock().await;
        state.awaiting_device = false;
        match acquired {
            Ok(stream) => {
                info!(
                    width = self.settings.constraints.width,
                    height = self.settings.constraints.height,
                    "liveness: camera granted"
                );
                state.device = Some(stream);
                self.emit(SessionEvent::Viewport {
                    mark: ViewportMark::Active,
                });
                self.schedule_face_guide();
                self.update_status(&mut state, MSG_CAMERA_READY, PROGRESS_READY);
                let controls = ControlState {
                    start_enabled: true,
                    ..state.controls
                };
                self.set_controls(&mut state, controls);
                if state.current_step_index == Step::Camera.index() {
                    self.set_active_step(&mut state, Step::Center.index());
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "liveness: camera access failed");
                self.update_status(&mut state, MSG_ACCESS_DENIED, PROGRESS_IDLE);
                self.emit(SessionEvent::ShowResult {
                    outcome: Outcome::Failure,
                    message: Some(MSG_ACCESS_REQUIRED.to_string()),
                });
                Err(SessionError::DeviceAccess(err))
            }
        }
    }

    /// Runs the full pose sequence. Returns `None` when nothing was run: a run
    /// was already in progress, the camera had to be requested first, or the
    /// camera was released mid-run.
    pub async fn start_verification(&self) -> Result<Option<VerificationRecord>> {
        let has_device = {
            let mut state = self.state.lock().await;
            if state.is_running {
                debug!("liveness: start ignored, verification already running");
                return Ok(None);
            }
            let has_device = state.device.is_some();
            if has_device {
                state.is_running = true;
                state.outcome = None;
                state.completed_steps.clear();
                self.emit(SessionEvent::StepMarkersReset);
                let controls = ControlState {
                    start_visible: false,
                    retry_visible: false,
                    ..state.controls
                };
                self.set_controls(&mut state, controls);
            }
            has_device
        };

        if !has_device {
            self.request_device_access().await?;
            return Ok(None);
        }

        let started_at = Utc::now();
        info!("liveness: verification started");
        let Some(outcome) = self.run_sequence().await else {
            return Ok(None);
        };
        self.complete_verification(outcome).await;

        Ok(Some(VerificationRecord {
            outcome,
            started_at,
            completed_at: Utc::now(),
        }))
    }

    async fn run_sequence(&self) -> Option<Outcome> {
        let mut all_passed = true;

        for (position, descriptor) in self.settings.steps().iter().enumerate() {
            let progress = step_progress(position);
            {
                let mut state = self.state.lock().await;
                if self.abort_if_released(&mut state) {
                    return None;
                }
                self.set_active_step(&mut state, descriptor.step.index());
                self.update_status(&mut state, &descriptor.prompt_message, progress);
            }
            info!(step = ?descriptor.step, progress, "liveness: step active");

            if self.executor.await_step_completion(descriptor).await == StepOutcome::Failed {
                warn!(step = ?descriptor.step, "liveness: step rejected by executor");
                all_passed = false;
            }

            let mut state = self.state.lock().await;
            if self.abort_if_released(&mut state) {
                return None;
            }
            self.mark_step_completed(&mut state, descriptor);
        }

        {
            let mut state = self.state.lock().await;
            self.update_status(&mut state, MSG_PROCESSING, PROGRESS_PROCESSING);
        }
        tokio::time::sleep(self.settings.processing_delay).await;

        let mut state = self.state.lock().await;
        if self.abort_if_released(&mut state) {
            return None;
        }
        drop(state);

        let outcome = if all_passed {
            let draw = self.outcome_source.lock().await.draw();
            let outcome = decide_outcome(draw, self.settings.success_probability);
            debug!(draw, ?outcome, "liveness: outcome drawn");
            outcome
        } else {
            Outcome::Failure
        };
        Some(outcome)
    }

    /// Applies the terminal state, then reveals the result surface after the
    /// configured delay unless the session was reset in the meantime.
    async fn complete_verification(&self, outcome: Outcome) {
        {
            let mut state = self.state.lock().await;
            if !state.is_running {
                debug!(?outcome, "liveness: no run to complete");
                return;
            }
            state.is_running = false;
            state.outcome = Some(outcome);
            let (message, mark) = match outcome {
                Outcome::Success => (MSG_SUCCESS, ViewportMark::Success),
                Outcome::Failure => (MSG_FAILURE, ViewportMark::Error),
            };
            self.update_status(&mut state, message, PROGRESS_DONE);
            self.emit(SessionEvent::Viewport { mark });
        }
        info!(?outcome, "liveness: verification complete");

        tokio::time::sleep(self.settings.result_reveal_delay).await;

        let state = self.state.lock().await;
        if state.outcome == Some(outcome) && !state.is_running {
            self.emit(SessionEvent::ShowResult {
                outcome,
                message: None,
            });
        } else {
            debug!(?outcome, "liveness: result reveal skipped after reset");
        }
    }

    pub async fn close_result(&self) {
        let mut state = self.state.lock().await;
        self.emit(SessionEvent::ResultDismissed);
        let controls = ControlState {
            retry_visible: true,
            ..state.controls
        };
        self.set_controls(&mut state, controls);
    }

    pub async fn reset_for_retry(&self) {
        let mut state = self.state.lock().await;
        if state.is_running {
            warn!("liveness: retry ignored while verification is running");
            return;
        }

        state.is_running = false;
        state.outcome = None;
        state.completed_steps.clear();
        state.active_step = None;
        self.emit(SessionEvent::Viewport {
            mark: ViewportMark::Idle,
        });
        self.emit(SessionEvent::StepMarkersReset);
        self.set_active_step(&mut state, Step::Camera.index());

        let has_device = state.device.is_some();
        if has_device {
            self.emit(SessionEvent::Viewport {
                mark: ViewportMark::Active,
            });
            self.set_active_step(&mut state, Step::Center.index());
            self.update_status(&mut state, MSG_RETRY_READY, PROGRESS_READY);
        } else {
            self.update_status(&mut state, MSG_RETRY_READY, PROGRESS_IDLE);
        }

        self.set_controls(
            &mut state,
            ControlState {
                start_enabled: has_device,
                start_visible: true,
                retry_visible: false,
            },
        );
        info!(has_device, "liveness: session reset for retry");
    }

    /// Releases the camera. Safe to call repeatedly or without a camera.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        let Some(device) = state.device.take() else {
            return;
        };
        device.stop_all_tracks();
        state.current_step_index = Step::Camera.index();
        state.active_step = None;
        self.emit(SessionEvent::DeviceReleased);
        self.update_status(&mut state, MSG_MOUNTED, PROGRESS_IDLE);
        self.set_controls(&mut state, ControlState::INITIAL);
        info!("liveness: camera released");
    }

    fn abort_if_released(&self, state: &mut SessionState) -> bool {
        if state.device.is_some() {
            return false;
        }
        warn!("liveness: camera released mid-run, abandoning verification");
        state.is_running = false;
        if state.controls != ControlState::INITIAL {
            self.set_controls(state, ControlState::INITIAL);
        }
        true
    }

    fn schedule_face_guide(&self) {
        let events = self.events.clone();
        let delay = self.settings.guide_reveal_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::FaceGuideVisible);
        });
    }

    fn set_active_step(&self, state: &mut SessionState, index: usize) {
        let Some(step) = Step::from_index(index) else {
            return;
        };
        state.current_step_index = index;
        state.active_step = Some(step);
        self.emit(SessionEvent::StepActivated { step });
    }

    fn mark_step_completed(&self, state: &mut SessionState, descriptor: &StepDescriptor) {
        if state.active_step == Some(descriptor.step) {
            state.active_step = None;
        }
        state.completed_steps.push(descriptor.step);
        self.emit(SessionEvent::StepCompleted {
            step: descriptor.step,
        });
    }

    fn update_status(&self, state: &mut SessionState, message: &str, progress: u8) {
        state.progress = progress;
        self.emit(SessionEvent::status(message, progress));
    }

    fn set_controls(&self, state: &mut SessionState, controls: ControlState) {
        state.controls = controls;
        self.emit(SessionEvent::Controls(controls));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
