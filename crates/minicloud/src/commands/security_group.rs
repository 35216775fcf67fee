use crate::SecurityGroupCommands;
use crate::utils::{Session, print_added, print_removed, require};
use minicloud_core::model::SecurityGroup;

pub fn handle(session: &Session, command: SecurityGroupCommands) -> anyhow::Result<()> {
    let groups = session.mc.security_groups();
    match command {
        SecurityGroupCommands::Add {
            name,
            description,
            cloud,
        } => {
            let mut group = SecurityGroup::new(name, description);
            group.cloud = cloud;
            print_added(&groups.add(group)?);
        }
        SecurityGroupCommands::Remove { name } => {
            let group = require(groups, &name)?;
            print_removed(&group, groups.remove(&group)?);
        }
        SecurityGroupCommands::Ssh { cloud } => {
            print_added(&groups.create_ssh_group(cloud.as_deref())?);
        }
    }
    Ok(())
}
