//! Plain-text rendering of session events for terminals.

use shared::{
    domain::{Outcome, ViewportMark},
    protocol::SessionEvent,
};

const BAR_WIDTH: usize = 20;

pub fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {progress:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

pub fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Status { message, progress } => {
            Some(format!("{} {message}", progress_bar(*progress)))
        }
        SessionEvent::StepActivated { step } => Some(format!("  > {}", step.label())),
        SessionEvent::StepCompleted { step } => Some(format!("  \u{2713} {}", step.label())),
        SessionEvent::FaceGuideVisible => Some("  (face guide shown)".to_string()),
        SessionEvent::Viewport {
            mark: ViewportMark::Error,
        } => Some("  (viewport: error)".to_string()),
        SessionEvent::Viewport {
            mark: ViewportMark::Success,
        } => Some("  (viewport: success)".to_string()),
        SessionEvent::ShowResult { outcome, message } => {
            let title = match outcome {
                Outcome::Success => "VERIFIED",
                Outcome::Failure => "NOT VERIFIED",
            };
            Some(match message {
                Some(message) => format!("== {title}: {message}"),
                None => format!("== {title}"),
            })
        }
        SessionEvent::DeviceReleased => Some("  (camera released)".to_string()),
        SessionEvent::Viewport { .. }
        | SessionEvent::StepMarkersReset
        | SessionEvent::Controls(_)
        | SessionEvent::ResultDismissed => None,
    }
}
