use crate::utils::Session;
use colored::Colorize;
use minicloud_core::{SystemTopologyOptions, TopologyOptions};

pub fn handle(
    session: &Session,
    deep: bool,
    show_empty: bool,
    cluster: Option<&str>,
) -> anyhow::Result<()> {
    let topology = match cluster {
        Some(name) => session
            .mc
            .cluster_topology(name, TopologyOptions { deep, show_empty })?,
        None => session.mc.system_topology(SystemTopologyOptions {
            deep,
            show_empty_compute: show_empty,
            show_empty_network: show_empty,
            show_unnamed_clusters: session.settings.show_unnamed_clusters,
        })?,
    };

    if topology.is_empty() {
        println!("{}", "Nothing deployed.".dimmed());
    } else {
        print!("{}", topology.text);
    }
    Ok(())
}
