//! Folds session events into the state the UI renders each frame.

use shared::{
    domain::{ControlState, Outcome, Step, ViewportMark},
    protocol::SessionEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Pending,
    Active,
    Completed,
}

impl StepMarker {
    pub fn glyph(self) -> &'static str {
        match self {
            StepMarker::Pending => "\u{25cb}",
            StepMarker::Active => "\u{25b6}",
            StepMarker::Completed => "\u{2714}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub outcome: Outcome,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub status: String,
    pub progress: u8,
    pub markers: [StepMarker; 5],
    pub viewport: ViewportMark,
    pub face_guide_visible: bool,
    pub controls: ControlState,
    pub result: Option<ResultView>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            status: String::new(),
            progress: 0,
            markers: [StepMarker::Pending; 5],
            viewport: ViewportMark::Idle,
            face_guide_visible: false,
            controls: ControlState::INITIAL,
            result: None,
        }
    }
}

impl ViewModel {
    pub fn marker(&self, step: Step) -> StepMarker {
        self.markers[step.index()]
    }

    pub fn camera_visible(&self) -> bool {
        self.viewport != ViewportMark::Idle
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Status { message, progress } => {
                self.status = message.clone();
                self.progress = *progress;
            }
            SessionEvent::StepActivated { step } => {
                for marker in self.markers.iter_mut() {
                    if *marker == StepMarker::Active {
                        *marker = StepMarker::Pending;
                    }
                }
                self.markers[step.index()] = StepMarker::Active;
            }
            SessionEvent::StepCompleted { step } => {
                self.markers[step.index()] = StepMarker::Completed;
            }
            SessionEvent::StepMarkersReset => {
                self.markers = [StepMarker::Pending; 5];
            }
            SessionEvent::Viewport { mark } => {
                self.viewport = *mark;
                if *mark == ViewportMark::Idle {
                    self.face_guide_visible = false;
                }
            }
            SessionEvent::FaceGuideVisible => self.face_guide_visible = true,
            SessionEvent::Controls(controls) => self.controls = *controls,
            SessionEvent::ShowResult { outcome, message } => {
                self.result = Some(ResultView {
                    outcome: *outcome,
                    message: message.clone(),
                });
            }
            SessionEvent::ResultDismissed => self.result = None,
            SessionEvent::DeviceReleased => {
                self.viewport = ViewportMark::Idle;
                self.face_guide_visible = false;
                self.controls.start_enabled = false;
            }
        }
    }
}
