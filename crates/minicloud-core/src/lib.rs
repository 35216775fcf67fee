//! MiniCloud core
//!
//! Cached entity management for a small cloud provisioning system. Clouds
//! and clusters are stored locally; networks, routers, security groups,
//! flavors, images and instances are mirrored from the clouds through remote
//! contexts.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ MiniCloud                                                │
//! │   CloudManager ─► ClusterManager ─► InstanceManager      │
//! │   NetworkManager  RouterManager  SecurityGroupManager    │
//! │   FlavorManager   ImageManager                           │
//! └──────┬──────────────────────────────┬────────────────────┘
//!        │ StoreSource                  │ RemoteSource
//!  ┌─────▼──────┐                ┌──────▼────────┐
//!  │ Database   │                │ RemoteContext │ (minicloud-cloud)
//!  └────────────┘                └───────────────┘
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod managers;
pub mod minicloud;
pub mod model;
pub mod policy;
pub mod remote;
pub mod source;
pub mod store;
pub mod topology;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::{CachedManager, ListOptions};
pub use entity::{Entity, fingerprint};
pub use error::{MiniCloudError, Result};
pub use hierarchy::ManagerNode;
pub use minicloud::MiniCloud;
pub use policy::{EvictionPolicy, OfflineCloudMarker, OfflineCloudState};
pub use remote::{ContextResolver, RemoteResource, RemoteSource, Resolution};
pub use source::{ListQuery, Source, StoreSource};
pub use store::{Backend, Database};
pub use topology::{SystemTopologyOptions, Topology, TopologyNode, TopologyOptions};
