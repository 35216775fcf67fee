use super::ClusterManager;
use crate::error::{MiniCloudError, Result};
use crate::model::Cluster;

impl ClusterManager {
    /// Add a user cluster; names of unnamed clusters are reserved
    pub fn add_cluster(&self, cluster: Cluster) -> Result<Cluster> {
        if cluster.is_unnamed() {
            tracing::error!("[Cluster mgr] {} is a reserved name.", cluster.name);
            return Err(MiniCloudError::integrity(format!(
                "cluster name {} is reserved",
                cluster.name
            )));
        }
        self.add(cluster)
    }

    /// Clusters of a cloud, the unnamed one included
    pub fn by_cloud(&self, cloud: &str) -> Result<Vec<Cluster>> {
        self.filtered(false, |c| c.cloud_name == cloud)
    }
}
