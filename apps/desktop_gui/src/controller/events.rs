//! UI/backend events and error modeling for desktop GUI controller.

use shared::protocol::SessionEvent;

pub enum UiEvent {
    Info(String),
    Session(SessionEvent),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Permission,
    Device,
    Backend,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    DeviceAccess,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("permission") || message_lower.contains("denied")
        {
            UiErrorCategory::Permission
        } else if message_lower.contains("no camera")
            || message_lower.contains("unavailable")
            || message_lower.contains("device")
        {
            UiErrorCategory::Device
        } else if message_lower.contains("backend")
            || message_lower.contains("runtime")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Backend
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Whether asking for the camera again could help.
    pub fn is_recoverable_by_user(&self) -> bool {
        matches!(
            self.category,
            UiErrorCategory::Permission | UiErrorCategory::Device
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_permission_denial_as_recoverable() {
        let err = UiError::from_message(
            UiErrorContext::DeviceAccess,
            "camera access failed: camera permission denied",
        );
        assert_eq!(err.category(), UiErrorCategory::Permission);
        assert_eq!(err.context(), UiErrorContext::DeviceAccess);
        assert!(err.is_recoverable_by_user());
    }

    #[test]
    fn classifies_runtime_failure_as_backend_error() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: failed to build runtime",
        );
        assert_eq!(err.category(), UiErrorCategory::Backend);
        assert!(!err.is_recoverable_by_user());
    }

    #[test]
    fn missing_camera_is_a_device_error() {
        let err = UiError::from_message(
            UiErrorContext::DeviceAccess,
            "camera access failed: no camera device found",
        );
        assert_eq!(err.category(), UiErrorCategory::Device);
        assert_eq!(err.message(), "camera access failed: no camera device found");
    }
}
