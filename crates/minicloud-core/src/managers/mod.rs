//! Managers of the MiniCloud entity kinds
//!
//! Stored kinds (clouds, clusters) read and write the local database; all
//! other kinds are mirrored from the clouds through a [`RemoteSource`].

mod catalog;
mod cloud;
mod cluster;
mod instance;
mod network;
mod router;
mod security_group;

pub use catalog::{flavor_manager, image_manager};
pub use cloud::CloudManager;

use crate::cache::CachedManager;
use crate::model::{Cluster, Flavor, Image, Instance, Network, Router, SecurityGroup};
use crate::remote::RemoteSource;
use crate::source::StoreSource;

pub type ClusterManager = CachedManager<StoreSource<Cluster>>;
pub type InstanceManager = CachedManager<RemoteSource<Instance>>;
pub type NetworkManager = CachedManager<RemoteSource<Network>>;
pub type RouterManager = CachedManager<RemoteSource<Router>>;
pub type SecurityGroupManager = CachedManager<RemoteSource<SecurityGroup>>;
pub type FlavorManager = CachedManager<RemoteSource<Flavor>>;
pub type ImageManager = CachedManager<RemoteSource<Image>>;
