//! ASCII topology rendering
//!
//! Every manager level implements [`TopologyNode`]: it lists the nodes under
//! a parent and names the level below it. [`render`] walks the levels and
//! draws a tree:
//!
//! ```text
//! Clouds
//! |
//! +---Cloud: lab (localhost)
//!     |
//!     +---Cluster: web
//!         +---Instance: vm-1 [10.0.0.2] (private) [default] ACTIVE
//! ```
//!
//! Siblings are rendered last to first, so every sibling after the first
//! reuses the listing the first one refreshed.

use crate::entity::Entity;
use crate::error::Result;
use crate::managers::{ClusterManager, CloudManager, InstanceManager, NetworkManager, RouterManager};

/// Parent name of the networks that are attached to no router
pub const UNROUTED: &str = "";

/// One entity in a topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub label: String,
    /// Rendered without a head line; its children move up one level
    pub hidden: bool,
    /// Rendered as a single UNAUTHENTICATED line
    pub unavailable: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            hidden: false,
            unavailable: false,
        }
    }

    pub fn of<E: Entity>(entity: &E) -> Self {
        Self::new(entity.name(), entity.describe())
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn unavailable(mut self, unavailable: bool) -> Self {
        self.unavailable = unavailable;
        self
    }
}

pub trait TopologyNode {
    /// Head line when the level is rendered on its own
    fn title(&self) -> &str;

    /// Nodes under `parent`, or all nodes of the level for `None`
    fn nodes(&self, parent: Option<&str>, deep: bool) -> Result<Vec<Node>>;

    fn child_level(&self) -> Option<&dyn TopologyNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyOptions {
    /// Refresh listings from the source
    pub deep: bool,
    /// Render nodes without children
    pub show_empty: bool,
}

/// Rendered tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub text: String,
    /// Number of rendered children at the top level
    pub count: usize,
    pub built: bool,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Render a whole level with its title as head line
pub fn render(level: &dyn TopologyNode, options: TopologyOptions, indent: &str) -> Result<Topology> {
    let frame = Frame {
        indent,
        root_prefix: "",
        prefix: "",
    };
    build(level, Some(level.title()), None, false, options, frame, false)
}

/// Render the subtree under one entity of `level`, headed by its label
///
/// The entity is drawn even when the level would hide it.
pub fn render_entity(
    level: &dyn TopologyNode,
    node: &Node,
    options: TopologyOptions,
    indent: &str,
) -> Result<Topology> {
    let frame = Frame {
        indent,
        root_prefix: "",
        prefix: "",
    };
    let node = node.clone().hidden(false);
    render_node(level, &node, options, frame, false)
}

/// Line-drawing position of a level
#[derive(Clone, Copy)]
struct Frame<'a> {
    indent: &'a str,
    root_prefix: &'a str,
    prefix: &'a str,
}

fn build(
    level: &dyn TopologyNode,
    head: Option<&str>,
    parent: Option<&str>,
    hidden: bool,
    options: TopologyOptions,
    frame: Frame<'_>,
    use_cached: bool,
) -> Result<Topology> {
    let head = head
        .map(|h| format!("{}{}{}\n", frame.indent, frame.root_prefix, h))
        .unwrap_or_default();
    let child_indent = format!("{}{}", frame.indent, frame.prefix);

    let mut text = String::new();
    let mut count = 0;
    let mut built = false;
    let mut fetch_optimized = use_cached;

    let nodes = level.nodes(parent, options.deep && !use_cached)?;
    for node in nodes.iter().rev() {
        let child_frame = Frame {
            indent: &child_indent,
            root_prefix: "+---",
            prefix: if count > 0 { "|   " } else { "    " },
        };
        let child = render_node(level, node, options, child_frame, fetch_optimized)?;
        fetch_optimized = true;

        if node.hidden && child.count == 0 {
            continue;
        }
        built |= child.built;
        if options.show_empty || child.count > 0 {
            text = if child.built && !hidden {
                format!("{}|\n{}{}", child_indent, child.text, text)
            } else {
                child.text + &text
            };
        }
        if child.count > 0 || options.show_empty || child.built {
            count += 1;
        }
    }

    if built || options.show_empty || count > 0 {
        text = head + &text;
    }
    Ok(Topology {
        text,
        count,
        built: built || options.show_empty,
    })
}

fn render_node(
    level: &dyn TopologyNode,
    node: &Node,
    options: TopologyOptions,
    frame: Frame<'_>,
    use_cached: bool,
) -> Result<Topology> {
    if node.unavailable {
        return Ok(Topology {
            text: format!(
                "{}{}{}: UNAUTHENTICATED\n",
                frame.indent, frame.root_prefix, node.label
            ),
            count: 0,
            built: false,
        });
    }

    let Some(child_level) = level.child_level() else {
        return Ok(Topology {
            text: format!("{}{}{}\n", frame.indent, frame.root_prefix, node.label),
            count: 1,
            built: true,
        });
    };

    if node.hidden {
        let frame = Frame {
            indent: frame.indent,
            root_prefix: "",
            prefix: "",
        };
        build(child_level, None, Some(&node.name), true, options, frame, use_cached)
    } else {
        build(
            child_level,
            Some(&node.label),
            Some(&node.name),
            false,
            options,
            frame,
            use_cached,
        )
    }
}

/// Which parts of a system topology show empty nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTopologyOptions {
    pub deep: bool,
    pub show_empty_compute: bool,
    pub show_empty_network: bool,
    /// Used by `MiniCloud::system_topology` when building the compute tree
    pub show_unnamed_clusters: bool,
}

/// Render a system: compute on top, networking below it
pub fn render_system(
    name: &str,
    compute: &dyn TopologyNode,
    networking: &dyn TopologyNode,
    options: SystemTopologyOptions,
    indent: &str,
) -> Result<Topology> {
    let net = build(
        networking,
        Some("Networking"),
        None,
        false,
        TopologyOptions {
            deep: options.deep,
            show_empty: options.show_empty_network,
        },
        Frame {
            indent,
            root_prefix: "+---",
            prefix: "    ",
        },
        false,
    )?;

    let compute_prefix = format!("{}   ", if net.count > 0 { "|" } else { " " });
    let comp = build(
        compute,
        Some("Compute"),
        None,
        false,
        TopologyOptions {
            deep: options.deep,
            show_empty: options.show_empty_compute,
        },
        Frame {
            indent,
            root_prefix: "+---",
            prefix: &compute_prefix,
        },
        false,
    )?;

    let head = format!("{indent}{name}\n{indent}|\n");
    let text = if comp.count > 0 {
        let mut text = head + &comp.text;
        if net.count > 0 {
            text.push_str(&format!("{indent}|\n{}", net.text));
        }
        text
    } else if net.count > 0 {
        head + &net.text
    } else {
        String::new()
    };

    let count = comp.count + net.count;
    Ok(Topology {
        text,
        count,
        built: count > 0,
    })
}

pub struct InstanceLevel<'a> {
    instances: &'a InstanceManager,
}

impl<'a> InstanceLevel<'a> {
    pub fn new(instances: &'a InstanceManager) -> Self {
        Self { instances }
    }
}

impl TopologyNode for InstanceLevel<'_> {
    fn title(&self) -> &str {
        "Instances"
    }

    fn nodes(&self, parent: Option<&str>, deep: bool) -> Result<Vec<Node>> {
        let instances = match parent {
            Some(cluster) => self.instances.by_cluster(cluster, deep)?,
            None => self.instances.filtered(deep, |_| true)?,
        };
        Ok(instances.iter().map(Node::of).collect())
    }

    fn child_level(&self) -> Option<&dyn TopologyNode> {
        None
    }
}

pub struct ClusterLevel<'a> {
    clusters: &'a ClusterManager,
    instances: InstanceLevel<'a>,
    show_unnamed: bool,
}

impl<'a> ClusterLevel<'a> {
    pub fn new(clusters: &'a ClusterManager, instances: &'a InstanceManager) -> Self {
        Self {
            clusters,
            instances: InstanceLevel::new(instances),
            show_unnamed: false,
        }
    }

    /// Draw unnamed clusters as clusters instead of hoisting their instances
    pub fn showing_unnamed(mut self, show: bool) -> Self {
        self.show_unnamed = show;
        self
    }
}

impl TopologyNode for ClusterLevel<'_> {
    fn title(&self) -> &str {
        "Clusters"
    }

    fn nodes(&self, parent: Option<&str>, _deep: bool) -> Result<Vec<Node>> {
        let clusters = match parent {
            Some(cloud) => self.clusters.by_cloud(cloud)?,
            None => self.clusters.list_all()?,
        };
        Ok(clusters
            .iter()
            .map(|c| Node::of(c).hidden(c.is_unnamed() && !self.show_unnamed))
            .collect())
    }

    fn child_level(&self) -> Option<&dyn TopologyNode> {
        Some(&self.instances)
    }
}

pub struct CloudLevel<'a> {
    clouds: &'a CloudManager,
    clusters: ClusterLevel<'a>,
}

impl<'a> CloudLevel<'a> {
    pub fn new(clouds: &'a CloudManager, clusters: ClusterLevel<'a>) -> Self {
        Self { clouds, clusters }
    }
}

impl TopologyNode for CloudLevel<'_> {
    fn title(&self) -> &str {
        "Clouds"
    }

    fn nodes(&self, _parent: Option<&str>, _deep: bool) -> Result<Vec<Node>> {
        Ok(self
            .clouds
            .list_all()?
            .iter()
            .map(|c| Node::of(c).unavailable(!self.clouds.is_authenticated(c)))
            .collect())
    }

    fn child_level(&self) -> Option<&dyn TopologyNode> {
        Some(&self.clusters)
    }
}

pub struct NetworkLevel<'a> {
    networks: &'a NetworkManager,
}

impl<'a> NetworkLevel<'a> {
    pub fn new(networks: &'a NetworkManager) -> Self {
        Self { networks }
    }
}

impl TopologyNode for NetworkLevel<'_> {
    fn title(&self) -> &str {
        "Networks"
    }

    fn nodes(&self, parent: Option<&str>, deep: bool) -> Result<Vec<Node>> {
        let networks = match parent {
            Some(UNROUTED) => self.networks.by_router(None, deep)?,
            Some(router) => self.networks.by_router(Some(router), deep)?,
            None => self.networks.filtered(deep, |_| true)?,
        };
        Ok(networks.iter().map(Node::of).collect())
    }

    fn child_level(&self) -> Option<&dyn TopologyNode> {
        None
    }
}

pub struct RouterLevel<'a> {
    routers: &'a RouterManager,
    networks: NetworkLevel<'a>,
}

impl<'a> RouterLevel<'a> {
    pub fn new(routers: &'a RouterManager, networks: &'a NetworkManager) -> Self {
        Self {
            routers,
            networks: NetworkLevel::new(networks),
        }
    }
}

impl TopologyNode for RouterLevel<'_> {
    fn title(&self) -> &str {
        "Routers"
    }

    /// Routers, then a hidden group of the unrouted networks
    fn nodes(&self, _parent: Option<&str>, deep: bool) -> Result<Vec<Node>> {
        let mut nodes: Vec<Node> = self
            .routers
            .filtered(deep, |_| true)?
            .iter()
            .map(Node::of)
            .collect();
        nodes.push(Node::new(UNROUTED, "Unrouted").hidden(true));
        Ok(nodes)
    }

    fn child_level(&self) -> Option<&dyn TopologyNode> {
        Some(&self.networks)
    }
}
