//! MiniCloud remote contexts
//!
//! This crate defines how MiniCloud talks to a backend deployment: a
//! [`RemoteContext`] per configured cloud, built by the [`Driver`] registered
//! for the cloud's type.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 minicloud-core                   │
//! │        (cached managers, topology)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                minicloud-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          trait RemoteContext              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ RemoteItem   │  │DriverRegistry│            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  stub driver  │
//! └───────────────┘
//! ```

pub mod context;
pub mod driver;
pub mod error;
pub mod resource;

// Re-exports
pub use context::{AuthStatus, RemoteContext};
pub use driver::{CloudType, ConnectionInfo, Driver, DriverRegistry};
pub use error::{CloudError, Result};
pub use resource::{DeleteOutcome, RemoteItem, ResourceKind, ResourceSpec};
