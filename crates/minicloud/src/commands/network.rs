use crate::NetworkCommands;
use crate::utils::{Session, print_added, print_removed, require};
use colored::Colorize;
use minicloud_core::model::Network;

pub fn handle(session: &Session, command: NetworkCommands) -> anyhow::Result<()> {
    let networks = session.mc.networks();
    match command {
        NetworkCommands::Add {
            name,
            cidrs,
            router,
            cloud,
        } => {
            let mut network = Network::new(name, cidrs);
            if let Some(router) = router {
                network = network.attached_to(require(session.mc.routers(), &router)?.name);
            }
            network.cloud = cloud;
            let network = networks.add_network(network)?;
            print_added(&network);
        }
        NetworkCommands::Remove { name } => {
            let network = require(networks, &name)?;
            print_removed(&network, networks.remove(&network)?);
        }
        NetworkCommands::Attach { network, router } => {
            let network = require(networks, &network)?;
            let router = require(session.mc.routers(), &router)?;
            networks.attach(&network, &router)?;
            println!(
                "{} Attached {} to {}",
                "✓".green(),
                network.name.cyan(),
                router.name.cyan()
            );
        }
        NetworkCommands::Detach { network } => {
            let network = require(networks, &network)?;
            networks.detach(&network)?;
            println!("{} Detached {}", "✓".green(), network.name.cyan());
        }
    }
    Ok(())
}
