use super::NetworkManager;
use crate::error::{MiniCloudError, Result};
use crate::model::{Network, Router};
use serde_json::json;

impl NetworkManager {
    pub fn external(&self, deep: bool) -> Result<Vec<Network>> {
        self.filtered(deep, |n| n.external)
    }

    pub fn non_external(&self, deep: bool) -> Result<Vec<Network>> {
        self.filtered(deep, |n| !n.external)
    }

    /// Networks attached to a router, or the unattached ones for `None`
    pub fn by_router(&self, router: Option<&str>, deep: bool) -> Result<Vec<Network>> {
        self.filtered(deep, |n| n.router.as_deref() == router)
    }

    /// Add a network after validating its cidrs
    pub fn add_network(&self, network: Network) -> Result<Network> {
        if let Some(bad) = network.cidrs.iter().find(|c| !Network::check_cidr(c)) {
            return Err(MiniCloudError::integrity(format!(
                "{} is not a valid cidr",
                bad
            )));
        }
        self.add(network)
    }

    pub fn attach(&self, network: &Network, router: &Router) -> Result<Option<Network>> {
        if network.external {
            return Err(MiniCloudError::integrity(format!(
                "external network {} cannot be attached to a router",
                network.name
            )));
        }
        self.update(network, &json!({ "router": router.name }))
    }

    pub fn detach(&self, network: &Network) -> Result<Option<Network>> {
        self.update(network, &json!({ "router": null }))
    }
}
