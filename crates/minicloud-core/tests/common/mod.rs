use minicloud_cloud::DriverRegistry;
use minicloud_cloud_stub::StubDriver;
use minicloud_core::model::Cloud;
use minicloud_core::testing::{FakeDriver, openstack_cloud};
use minicloud_core::{Backend, Database, MiniCloud};
use std::sync::Arc;
use tempfile::TempDir;

/// A MiniCloud on a file store, with a fake OpenStack driver and the stub
/// driver registered
pub struct TestSystem {
    pub dir: TempDir,
    pub driver: Arc<FakeDriver>,
    pub mc: MiniCloud,
}

impl TestSystem {
    pub fn persistent() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(FakeDriver::new());
        let db = Database::open(Backend::Directory(dir.path().to_path_buf())).unwrap();
        let mc = MiniCloud::open(db, registry(&driver)).unwrap();
        Self { dir, driver, mc }
    }

    /// Open another MiniCloud on the same directory
    #[allow(dead_code)]
    pub fn reopen(&self) -> MiniCloud {
        let db = Database::open(Backend::Directory(self.dir.path().to_path_buf())).unwrap();
        MiniCloud::open(db, registry(&self.driver)).unwrap()
    }

    pub fn with_cloud(name: &str) -> Self {
        let system = Self::persistent();
        system.mc.clouds().add(openstack_cloud(name)).unwrap();
        system
    }
}

pub fn registry(driver: &Arc<FakeDriver>) -> DriverRegistry {
    DriverRegistry::new()
        .with_driver(driver.clone())
        .with_driver(Arc::new(StubDriver))
}

/// A MiniCloud on the memory store
#[allow(dead_code)]
pub fn in_memory(driver: &Arc<FakeDriver>) -> MiniCloud {
    MiniCloud::open(Database::in_memory(), registry(driver)).unwrap()
}

#[allow(dead_code)]
pub fn stub_cloud(name: &str) -> Cloud {
    Cloud::stub(name)
}
