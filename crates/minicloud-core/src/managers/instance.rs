use super::InstanceManager;
use crate::error::Result;
use crate::model::Instance;

impl InstanceManager {
    pub fn by_cluster(&self, cluster: &str, deep: bool) -> Result<Vec<Instance>> {
        self.filtered(deep, |i| i.cluster_name.as_deref() == Some(cluster))
    }

    pub fn by_network(&self, network: &str, deep: bool) -> Result<Vec<Instance>> {
        self.filtered(deep, |i| i.network.as_deref() == Some(network))
    }

    pub fn by_ip(&self, ip: &str) -> Result<Option<Instance>> {
        Ok(self
            .filtered(false, |i| i.ip.as_deref() == Some(ip))?
            .into_iter()
            .next())
    }
}
