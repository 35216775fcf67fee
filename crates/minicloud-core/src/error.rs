//! MiniCloud core error types

use minicloud_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MiniCloudError {
    /// Duplicate name, missing linkage, or no context resolvable
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Resource in use: {0}")]
    InUse(String),

    #[error("Does not exist: {0}")]
    DoesNotExist(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MiniCloudError {
    pub fn integrity(msg: impl Into<String>) -> Self {
        MiniCloudError::Integrity(msg.into())
    }
}

impl From<CloudError> for MiniCloudError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::AuthenticationFailed(msg) | CloudError::NotAuthenticated(msg) => {
                MiniCloudError::NotAuthorized(msg)
            }
            CloudError::Transport(msg) | CloudError::Timeout(msg) => {
                MiniCloudError::Transport(msg)
            }
            CloudError::ResourceNotFound(msg) => MiniCloudError::DoesNotExist(msg),
            CloudError::ResourceInUse(msg) => MiniCloudError::InUse(msg),
            CloudError::Json(e) => MiniCloudError::Json(e),
            other => MiniCloudError::Integrity(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MiniCloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_error_categories() {
        let err: MiniCloudError = CloudError::Timeout("keystone".into()).into();
        assert!(matches!(err, MiniCloudError::Transport(_)));

        let err: MiniCloudError = CloudError::NotAuthenticated("lab".into()).into();
        assert!(matches!(err, MiniCloudError::NotAuthorized(_)));

        let err: MiniCloudError = CloudError::ResourceInUse("net".into()).into();
        assert!(matches!(err, MiniCloudError::InUse(_)));

        let err: MiniCloudError = CloudError::ResourceAlreadyExists("vm".into()).into();
        assert!(matches!(err, MiniCloudError::Integrity(_)));
    }
}
