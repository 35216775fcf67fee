use crate::RouterCommands;
use crate::utils::{Session, print_added, print_removed, require};
use colored::Colorize;
use minicloud_core::model::Router;

pub fn handle(session: &Session, command: RouterCommands) -> anyhow::Result<()> {
    let routers = session.mc.routers();
    match command {
        RouterCommands::Add {
            name,
            external,
            cloud,
        } => {
            let mut router = Router::new(name);
            router.cloud = cloud;
            let mut router = routers.add(router)?;
            if let Some(external) = external {
                let network = require(session.mc.networks(), &external)?;
                if let Some(uplinked) = routers.uplink(&router, &network)? {
                    router = uplinked;
                }
            }
            print_added(&router);
        }
        RouterCommands::Remove { name } => {
            let router = require(routers, &name)?;
            print_removed(&router, routers.remove(&router)?);
        }
        RouterCommands::Uplink { router, network } => {
            let router = require(routers, &router)?;
            let network = require(session.mc.networks(), &network)?;
            routers.uplink(&router, &network)?;
            println!(
                "{} Uplinked {} to {}",
                "✓".green(),
                router.name.cyan(),
                network.name.cyan()
            );
        }
        RouterCommands::Unlink { router } => {
            let router = require(routers, &router)?;
            routers.unlink(&router)?;
            println!("{} Unlinked {}", "✓".green(), router.name.cyan());
        }
    }
    Ok(())
}
