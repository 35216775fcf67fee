pub mod cloud;
pub mod cluster;
pub mod instance;
pub mod list;
pub mod network;
pub mod router;
pub mod security_group;
pub mod shell;
pub mod topology;
pub mod wipe;

use crate::Commands;
use crate::utils::Session;

/// Run one command against an open session
pub fn dispatch(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Configure { stub, name } => cloud::configure(session, stub, name),
        Commands::Show => cloud::show(session),
        Commands::Unconfigure { name } => cloud::unconfigure(session, name.as_deref()),
        Commands::Topology {
            deep,
            show_empty,
            cluster,
        } => topology::handle(session, deep, show_empty, cluster.as_deref()),
        Commands::List { kind, deep } => list::handle(session, kind, deep),
        Commands::Wipe { yes, clouds } => wipe::handle(session, yes, clouds),
        Commands::Cluster(cmd) => cluster::handle(session, cmd),
        Commands::Network(cmd) => network::handle(session, cmd),
        Commands::Router(cmd) => router::handle(session, cmd),
        Commands::Instance(cmd) => instance::handle(session, cmd),
        Commands::SecurityGroup(cmd) => security_group::handle(session, cmd),
        Commands::Version => {
            println!("minicloud {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Shell => shell::handle(session),
    }
}
