use super::RouterManager;
use crate::error::{MiniCloudError, Result};
use crate::model::{Network, Router};
use serde_json::json;

impl RouterManager {
    /// Connect the router to an external network
    pub fn uplink(&self, router: &Router, external: &Network) -> Result<Option<Router>> {
        if !external.external {
            return Err(MiniCloudError::integrity(format!(
                "{} is not an external network",
                external.name
            )));
        }
        self.update(router, &json!({ "external_network": external.name }))
    }

    pub fn unlink(&self, router: &Router) -> Result<Option<Router>> {
        self.update(router, &json!({ "external_network": null }))
    }
}
