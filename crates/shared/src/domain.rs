use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STEP_DURATION_MS: u64 = 3000;

/// One stage of the guided pose sequence, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Camera,
    Center,
    Left,
    Right,
    Final,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Camera,
        Step::Center,
        Step::Left,
        Step::Right,
        Step::Final,
    ];

    pub fn index(self) -> usize {
        match self {
            Step::Camera => 0,
            Step::Center => 1,
            Step::Left => 2,
            Step::Right => 3,
            Step::Final => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Camera => "Enable camera",
            Step::Center => "Look at the camera",
            Step::Left => "Turn left",
            Step::Right => "Turn right",
            Step::Final => "Final check",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub step: Step,
    pub prompt_message: String,
    pub duration_ms: u64,
}

impl StepDescriptor {
    pub fn new(step: Step, prompt_message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            step,
            prompt_message: prompt_message.into(),
            duration_ms,
        }
    }

    /// The pose steps that follow camera access, each held for `duration_ms`.
    pub fn sequence_with_duration(duration_ms: u64) -> Vec<StepDescriptor> {
        vec![
            Self::new(Step::Center, "Look straight at the camera", duration_ms),
            Self::new(Step::Left, "Slowly turn your head to the left", duration_ms),
            Self::new(Step::Right, "Now turn your head to the right", duration_ms),
            Self::new(
                Step::Final,
                "Look straight ahead for final verification",
                duration_ms,
            ),
        ]
    }

    pub fn default_sequence() -> Vec<StepDescriptor> {
        Self::sequence_with_duration(DEFAULT_STEP_DURATION_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing: Facing::User,
        }
    }
}

/// Visual state of the camera viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportMark {
    Idle,
    Active,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub start_enabled: bool,
    pub start_visible: bool,
    pub retry_visible: bool,
}

impl ControlState {
    pub const INITIAL: ControlState = ControlState {
        start_enabled: false,
        start_visible: true,
        retry_visible: false,
    };
}

impl Default for ControlState {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostAction {
    PlaceholderClicked,
    StartClicked,
    RetryClicked,
    CloseClicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub outcome: Outcome,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
