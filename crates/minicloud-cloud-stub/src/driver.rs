//! Stub driver

use crate::context::StubContext;
use minicloud_cloud::{CloudType, ConnectionInfo, Driver, RemoteContext, Result};
use std::sync::Arc;

/// Driver building one fresh [`StubContext`] per cloud
#[derive(Debug, Default, Clone, Copy)]
pub struct StubDriver;

impl StubDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for StubDriver {
    fn cloud_type(&self) -> CloudType {
        CloudType::Stub
    }

    fn connect(&self, info: &ConnectionInfo) -> Result<Arc<dyn RemoteContext>> {
        tracing::debug!("[StubDriver] new context for {}", info.cloud_name);
        Ok(Arc::new(StubContext::new(info.cloud_name.clone())))
    }
}
