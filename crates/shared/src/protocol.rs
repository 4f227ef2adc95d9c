use serde::{Deserialize, Serialize};

use crate::domain::{ControlState, Outcome, Step, ViewportMark};

/// Everything a display surface needs to render a verification session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    Status {
        message: String,
        progress: u8,
    },
    StepActivated {
        step: Step,
    },
    StepCompleted {
        step: Step,
    },
    StepMarkersReset,
    Viewport {
        mark: ViewportMark,
    },
    FaceGuideVisible,
    Controls(ControlState),
    ShowResult {
        outcome: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    ResultDismissed,
    DeviceReleased,
}

impl SessionEvent {
    pub fn status(message: impl Into<String>, progress: u8) -> Self {
        SessionEvent::Status {
            message: message.into(),
            progress,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Status { .. } => "status",
            SessionEvent::StepActivated { .. } => "step_activated",
            SessionEvent::StepCompleted { .. } => "step_completed",
            SessionEvent::StepMarkersReset => "step_markers_reset",
            SessionEvent::Viewport { .. } => "viewport",
            SessionEvent::FaceGuideVisible => "face_guide_visible",
            SessionEvent::Controls(_) => "controls",
            SessionEvent::ShowResult { .. } => "show_result",
            SessionEvent::ResultDismissed => "result_dismissed",
            SessionEvent::DeviceReleased => "device_released",
        }
    }
}
