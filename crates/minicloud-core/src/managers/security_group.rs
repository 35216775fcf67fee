use super::SecurityGroupManager;
use crate::error::Result;
use crate::model::{PUBLIC_SSH, SecurityGroup, SecurityGroupRule};
use crate::remote::RemoteResource;

impl SecurityGroupManager {
    /// Create the group allowing ssh from anywhere
    pub fn create_ssh_group(&self, cloud: Option<&str>) -> Result<SecurityGroup> {
        let mut group = SecurityGroup::new(PUBLIC_SSH, "sg for ssh access")
            .with_rule(SecurityGroupRule::ingress("tcp", 22, "0.0.0.0/0"));
        if let Some(cloud) = cloud {
            group.bind_cloud(cloud);
        }
        self.add(group)
    }
}
