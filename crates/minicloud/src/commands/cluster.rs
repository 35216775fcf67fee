use crate::ClusterCommands;
use crate::utils::{Session, print_added, print_removed, require};

pub fn handle(session: &Session, command: ClusterCommands) -> anyhow::Result<()> {
    match command {
        ClusterCommands::Add { name, cloud } => {
            let cloud = session.cloud_name(cloud.as_deref())?;
            let cluster = session.mc.add_cluster(&name, &cloud)?;
            print_added(&cluster);
        }
        ClusterCommands::Remove { name } => {
            let clusters = session.mc.clusters();
            let cluster = require(clusters, &name)?;
            print_removed(&cluster, clusters.deep_remove(&cluster)?);
        }
    }
    Ok(())
}
