//! Remote context error types

use thiserror::Error;

/// Errors raised by remote cloud contexts and drivers
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("No driver for cloud type: {0}")]
    DriverNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Resource in use: {0}")]
    ResourceInUse(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Transport-level failures the caller may treat as temporary
    pub fn is_transient(&self) -> bool {
        matches!(self, CloudError::Transport(_) | CloudError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
