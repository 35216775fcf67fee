use crate::entity::Entity;
use serde::{Deserialize, Serialize};

const UNNAMED: &str = "UNNAMED";

/// Named group of instances within one cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub cloud_name: String,
}

impl Cluster {
    pub fn new(name: impl Into<String>, cloud_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cloud_name: cloud_name.into(),
        }
    }

    /// The synthetic cluster holding a cloud's instances that have no cluster
    pub fn unnamed(cloud_name: &str) -> Self {
        Self::new(Self::unnamed_name(cloud_name), cloud_name)
    }

    pub fn unnamed_name(cloud_name: &str) -> String {
        format!("{}.{}", cloud_name, UNNAMED)
    }

    pub fn is_unnamed_name(name: &str) -> bool {
        name.contains(UNNAMED)
    }

    pub fn is_unnamed(&self) -> bool {
        Self::is_unnamed_name(&self.name)
    }
}

impl Entity for Cluster {
    const KIND: &'static str = "cluster";

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_name(&self) -> Option<&str> {
        Some(&self.cloud_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_cluster() {
        let cluster = Cluster::unnamed("lab");
        assert_eq!(cluster.name, "lab.UNNAMED");
        assert!(cluster.is_unnamed());
        assert!(cluster.is_child_of("lab"));
        assert!(!Cluster::new("web", "lab").is_unnamed());
    }
}
