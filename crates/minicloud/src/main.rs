mod commands;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "minicloud")]
#[command(about = "Provision and inspect small cloud deployments", long_about = None)]
pub struct Cli {
    /// Log at info level
    #[arg(long, global = true)]
    info: bool,
    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,
    /// Log at trace level and print full error chains
    #[arg(long, global = true)]
    trace: bool,
    /// Configuration file (default: discovered minicloud.yaml)
    #[arg(long, global = true, env = "MINICLOUD_CONFIG")]
    config: Option<PathBuf>,
    /// Keep declarations in memory only
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a cloud from the configured defaults
    Configure {
        /// Add an offline stub cloud instead
        #[arg(long)]
        stub: bool,
        /// Cloud name (overrides the configured one)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the configured clouds and clusters
    Show,
    /// Forget a cloud and everything declared under it
    Unconfigure {
        /// Cloud name (default: the only cloud)
        name: Option<String>,
    },
    /// Print the system topology
    Topology {
        /// Refresh every listing from the clouds
        #[arg(long)]
        deep: bool,
        /// Also print empty clusters and routers
        #[arg(long)]
        show_empty: bool,
        /// Only print this cluster and its instances
        #[arg(long)]
        cluster: Option<String>,
    },
    /// List entities of one kind
    List {
        kind: Kind,
        /// Refresh the listing from the clouds
        #[arg(long)]
        deep: bool,
    },
    /// Remove every resource of the deployment
    Wipe {
        /// Confirm the wipe
        #[arg(short, long)]
        yes: bool,
        /// Also remove clusters and clouds
        #[arg(long)]
        clouds: bool,
    },
    #[command(subcommand)]
    Cluster(ClusterCommands),
    #[command(subcommand)]
    Network(NetworkCommands),
    #[command(subcommand)]
    Router(RouterCommands),
    #[command(subcommand)]
    Instance(InstanceCommands),
    #[command(subcommand)]
    SecurityGroup(SecurityGroupCommands),
    /// Show version information
    Version,
    /// Read commands line by line from stdin
    Shell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    Clouds,
    Clusters,
    Instances,
    Networks,
    Routers,
    SecurityGroups,
    Flavors,
    Images,
}

#[derive(Subcommand)]
pub enum ClusterCommands {
    /// Add a cluster to a cloud
    Add {
        name: String,
        /// Cloud name (default: the only cloud)
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Remove a cluster and its instances
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Create a network
    Add {
        name: String,
        /// Subnet in a.b.c.d/n notation (repeatable)
        #[arg(long = "cidr", required = true)]
        cidrs: Vec<String>,
        /// Router to attach the network to
        #[arg(long)]
        router: Option<String>,
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Delete a network
    Remove { name: String },
    /// Attach a network to a router
    Attach { network: String, router: String },
    /// Detach a network from its router
    Detach { network: String },
}

#[derive(Subcommand)]
pub enum RouterCommands {
    /// Create a router
    Add {
        name: String,
        /// External network to uplink to
        #[arg(long)]
        external: Option<String>,
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Delete a router
    Remove { name: String },
    /// Set the external gateway of a router
    Uplink { router: String, network: String },
    /// Clear the external gateway of a router
    Unlink { router: String },
}

#[derive(Subcommand)]
pub enum InstanceCommands {
    /// Boot an instance
    Add {
        name: String,
        #[arg(long)]
        network: String,
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long)]
        flavor: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        security_group: Option<String>,
    },
    /// Delete an instance
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum SecurityGroupCommands {
    /// Create an empty security group
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Delete a security group
    Remove { name: String },
    /// Create the public_ssh group
    Ssh {
        #[arg(long)]
        cloud: Option<String>,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.trace {
        "trace"
    } else if cli.debug {
        "debug"
    } else if cli.info {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(err: &anyhow::Error, trace: bool) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if trace {
        for cause in err.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Version needs no configuration
    if matches!(cli.command, Commands::Version) {
        println!("minicloud {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = minicloud_config::load(cli.config.as_deref())?;
    let session = utils::Session::open(settings, cli.memory)?;
    commands::dispatch(&session, cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let trace = cli.trace;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, trace);
            ExitCode::FAILURE
        }
    }
}
