//! Remote context trait definition

use crate::error::Result;
use crate::resource::{DeleteOutcome, RemoteItem, ResourceKind, ResourceSpec};
use serde::{Deserialize, Serialize};

/// Authenticated handle to one backend deployment
///
/// All resource operations of a cloud run through its context. Contexts are
/// shared between managers, so implementations keep their mutable state
/// (tokens, counters) behind their own locks.
pub trait RemoteContext: Send + Sync {
    /// Returns the driver name (e.g., "openstack", "stub")
    fn driver_name(&self) -> &str;

    /// Authenticate against the backend
    fn authenticate(&self) -> Result<AuthStatus>;

    /// Whether a previous authentication succeeded
    fn authenticated(&self) -> bool;

    /// Offline contexts serve synthetic data and never talk to a backend
    fn is_offline(&self) -> bool {
        false
    }

    /// List resources of a kind, optionally restricted to one name
    fn list(&self, kind: ResourceKind, name: Option<&str>) -> Result<Vec<RemoteItem>>;

    /// Create a resource
    fn create(&self, spec: &ResourceSpec) -> Result<RemoteItem>;

    /// Apply a patch to an existing resource
    fn update(&self, kind: ResourceKind, id: &str, patch: &serde_json::Value)
    -> Result<RemoteItem>;

    /// Delete a resource
    fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/project information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
