//! Stub cloud for MiniCloud
//!
//! An offline [`RemoteContext`](minicloud_cloud::RemoteContext) keeping all
//! resources in memory. It is what `minicloud configure --stub` wires in, and
//! what tests use when they need a cloud that behaves like a real one.
//!
//! # Example
//!
//! ```
//! use minicloud_cloud::{RemoteContext, ResourceKind};
//! use minicloud_cloud_stub::StubContext;
//!
//! let ctx = StubContext::new("stub");
//! ctx.authenticate().unwrap();
//!
//! let flavors = ctx.list(ResourceKind::Flavor, None).unwrap();
//! assert_eq!(flavors[0].name, "m1.stubby");
//! ```

pub mod context;
pub mod driver;

pub use context::{STUB_FLAVOR, STUB_IMAGE, STUB_SECURITY_GROUP, StubContext};
pub use driver::StubDriver;
