//! Backend commands queued from UI to backend worker.

use shared::domain::HostAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    Action(HostAction),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Action(HostAction::PlaceholderClicked) => "placeholder_clicked",
            BackendCommand::Action(HostAction::StartClicked) => "start_clicked",
            BackendCommand::Action(HostAction::RetryClicked) => "retry_clicked",
            BackendCommand::Action(HostAction::CloseClicked) => "close_clicked",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
