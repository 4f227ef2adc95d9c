use capture::DeviceAccessError;
use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera access failed: {0}")]
    DeviceAccess(#[from] DeviceAccessError),
}

impl SessionError {
    pub fn to_api_error(&self) -> ApiError {
        match self {
            SessionError::DeviceAccess(err) => ApiError::from(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
