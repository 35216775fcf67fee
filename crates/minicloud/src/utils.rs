use anyhow::Context;
use colored::Colorize;
use minicloud_cloud::DriverRegistry;
use minicloud_cloud_stub::StubDriver;
use minicloud_config::{Settings, StoreSettings};
use minicloud_core::{Backend, CachedManager, Database, Entity, MiniCloud, Source};
use std::sync::Arc;

/// Settings plus the MiniCloud opened from them
pub struct Session {
    pub settings: Settings,
    pub mc: MiniCloud,
}

impl Session {
    pub fn open(settings: Settings, force_memory: bool) -> anyhow::Result<Self> {
        let backend = match &settings.store {
            StoreSettings::File { path } if !force_memory => Backend::Directory(path.clone()),
            _ => Backend::Memory,
        };
        let database = Database::open(backend.clone())
            .with_context(|| format!("cannot open the {:?} store", backend))?;
        let drivers = DriverRegistry::new().with_driver(Arc::new(StubDriver::new()));
        let mc = MiniCloud::open(database, drivers)?;
        Ok(Self { settings, mc })
    }

    /// The named cloud, or the only configured one
    pub fn cloud_name(&self, name: Option<&str>) -> anyhow::Result<String> {
        if let Some(name) = name {
            return Ok(self.require_cloud(name)?.name);
        }
        match self.mc.get_cloud()? {
            Some(cloud) => Ok(cloud.name),
            None => anyhow::bail!("no cloud configured, run `minicloud configure` first"),
        }
    }

    pub fn require_cloud(&self, name: &str) -> anyhow::Result<minicloud_core::model::Cloud> {
        self.mc
            .clouds()
            .get(name)?
            .ok_or_else(|| anyhow::anyhow!("cloud '{}' not found", name))
    }
}

/// Look an entity up by name, failing when it is unknown
pub fn require<S: Source>(manager: &CachedManager<S>, name: &str) -> anyhow::Result<S::Entity> {
    manager
        .get(name)?
        .ok_or_else(|| anyhow::anyhow!("{} '{}' not found", S::Entity::KIND.replace('_', " "), name))
}

pub fn print_added<E: Entity>(entity: &E) {
    println!("{} Added {}", "✓".green(), entity.describe());
}

pub fn print_removed<E: Entity>(entity: &E, removed: bool) {
    if removed {
        println!("{} Removed {}", "✓".green(), entity.describe());
    } else {
        println!("{} {} was not removed", "✗".yellow(), entity.describe());
    }
}

pub fn print_entities<E: Entity>(entities: &[E]) {
    if entities.is_empty() {
        println!("{}", "(none)".dimmed());
        return;
    }
    for entity in entities {
        println!("{}", entity.describe());
    }
}
