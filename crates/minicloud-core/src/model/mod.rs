//! Entities of a MiniCloud system
//!
//! Clouds and clusters are stored locally; everything else lives on a cloud
//! and is mirrored through a remote context.

mod cloud;
mod cluster;
mod flavor;
mod image;
mod instance;
mod network;
mod router;
mod security_group;

pub use cloud::Cloud;
pub use cluster::Cluster;
pub use flavor::Flavor;
pub use image::Image;
pub use instance::{Instance, STATUS_BUILD};
pub use network::Network;
pub use router::Router;
pub use security_group::{PUBLIC_SSH, SecurityGroup, SecurityGroupRule};
