use crate::InstanceCommands;
use crate::utils::{Session, print_added, print_removed, require};
use minicloud_core::model::Instance;

pub fn handle(session: &Session, command: InstanceCommands) -> anyhow::Result<()> {
    let instances = session.mc.instances();
    match command {
        InstanceCommands::Add {
            name,
            network,
            cluster,
            flavor,
            image,
            security_group,
        } => {
            let network = require(session.mc.networks(), &network)?;
            let mut instance = Instance::new(name).on_network(network.name);
            if let Some(cluster) = cluster {
                instance = instance.in_cluster(require(session.mc.clusters(), &cluster)?.name);
            }
            if let Some(flavor) = flavor {
                instance = instance.with_flavor(flavor);
            }
            if let Some(image) = image {
                instance = instance.with_image(image);
            }
            if let Some(security_group) = security_group {
                instance = instance.with_security_group(security_group);
            }
            let instance = instances.add(instance)?;
            print_added(&instance);
        }
        InstanceCommands::Remove { name } => {
            let instance = require(instances, &name)?;
            print_removed(&instance, instances.remove(&instance)?);
        }
    }
    Ok(())
}
