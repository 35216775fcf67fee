//! In-memory remote context

use minicloud_cloud::{
    AuthStatus, CloudError, DeleteOutcome, RemoteContext, RemoteItem, ResourceKind, ResourceSpec,
    Result,
};
use serde_json::{Value, json};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const STUB_FLAVOR: &str = "m1.stubby";
pub const STUB_IMAGE: &str = "Cirry";
pub const STUB_SECURITY_GROUP: &str = "default";

/// Offline cloud serving resources from memory
///
/// A fresh context knows one flavor, one image and the default security
/// group. Everything created through it lives as long as the context.
pub struct StubContext {
    cloud_name: String,
    state: Mutex<StubState>,
}

#[derive(Debug, Default)]
struct StubState {
    authenticated: bool,
    items: Vec<RemoteItem>,
    next_id: u64,
    instance_count: u32,
}

impl StubState {
    fn new_id(&mut self, kind: ResourceKind) -> String {
        self.next_id += 1;
        format!("stub-{}-{}", kind, self.next_id)
    }

    fn find(&self, kind: ResourceKind, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.kind == kind && i.id == id)
    }

    fn find_by_name(&self, kind: ResourceKind, name: &str) -> Option<&RemoteItem> {
        self.items.iter().find(|i| i.kind == kind && i.name == name)
    }
}

impl StubContext {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        let mut state = StubState::default();

        let flavor_id = state.new_id(ResourceKind::Flavor);
        state
            .items
            .push(RemoteItem::new(ResourceKind::Flavor, flavor_id, STUB_FLAVOR));
        let image_id = state.new_id(ResourceKind::Image);
        state
            .items
            .push(RemoteItem::new(ResourceKind::Image, image_id, STUB_IMAGE));
        let sg_id = state.new_id(ResourceKind::SecurityGroup);
        state.items.push(
            RemoteItem::new(ResourceKind::SecurityGroup, sg_id, STUB_SECURITY_GROUP)
                .with_attribute("description", json!("Default SG"))
                .with_attribute("rules", json!([])),
        );

        Self {
            cloud_name: cloud_name.into(),
            state: Mutex::new(state),
        }
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_auth(state: &StubState) -> Result<()> {
        if state.authenticated {
            Ok(())
        } else {
            Err(CloudError::NotAuthenticated("stub context".to_string()))
        }
    }

    /// Boot an instance on the network named in its spec
    ///
    /// The address is taken from the first cidr of the network: the host
    /// part is the number of instances this context booted so far, plus one.
    fn boot_instance(state: &mut StubState, spec: &ResourceSpec) -> Result<RemoteItem> {
        let network_name = spec
            .get_config::<String>("network")
            .ok_or_else(|| CloudError::InvalidConfig("instance needs a network".to_string()))?;
        let network = state
            .find_by_name(ResourceKind::Network, &network_name)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("network {}", network_name)))?;
        let cidrs: Vec<String> = network.get_attribute("cidrs").unwrap_or_default();
        let prefix = cidrs
            .first()
            .and_then(|cidr| cidr.split('/').next())
            .map(|subnet| {
                let quads: Vec<&str> = subnet.split('.').collect();
                quads[..quads.len().min(3)].join(".")
            })
            .ok_or_else(|| {
                CloudError::InvalidConfig(format!("network {} has no cidr", network_name))
            })?;

        state.instance_count += 1;
        let ip = format!("{}.{}", prefix, state.instance_count + 1);

        let id = state.new_id(ResourceKind::Instance);
        let mut item = RemoteItem::new(ResourceKind::Instance, id, spec.name.clone())
            .with_attribute("network", json!(network_name))
            .with_attribute("ip", json!(ip))
            .with_attribute("status", json!("ACTIVE"));
        for key in ["cluster", "flavor", "image", "security_group"] {
            if let Some(value) = spec.config.get(key) {
                item.set_attribute(key, value.clone());
            }
        }
        tracing::debug!("[StubContext] booted instance {} at {}", item.name, ip);
        Ok(item)
    }
}

impl RemoteContext for StubContext {
    fn driver_name(&self) -> &str {
        "stub"
    }

    fn authenticate(&self) -> Result<AuthStatus> {
        self.state().authenticated = true;
        Ok(AuthStatus::ok(format!("stub ({})", self.cloud_name)))
    }

    fn authenticated(&self) -> bool {
        self.state().authenticated
    }

    fn is_offline(&self) -> bool {
        true
    }

    fn list(&self, kind: ResourceKind, name: Option<&str>) -> Result<Vec<RemoteItem>> {
        let state = self.state();
        Self::require_auth(&state)?;
        Ok(state
            .items
            .iter()
            .filter(|i| i.kind == kind && name.is_none_or(|n| i.name == n))
            .cloned()
            .collect())
    }

    fn create(&self, spec: &ResourceSpec) -> Result<RemoteItem> {
        let mut state = self.state();
        Self::require_auth(&state)?;

        if state.find_by_name(spec.kind, &spec.name).is_some() {
            return Err(CloudError::ResourceAlreadyExists(format!(
                "{} {}",
                spec.kind, spec.name
            )));
        }

        let item = match spec.kind {
            ResourceKind::Instance => Self::boot_instance(&mut state, spec)?,
            ResourceKind::Network => {
                let id = state.new_id(spec.kind);
                let cidrs = spec
                    .get_config::<Vec<String>>("cidrs")
                    .or_else(|| spec.get_config::<String>("cidr").map(|c| vec![c]))
                    .unwrap_or_default();
                RemoteItem::new(spec.kind, id, spec.name.clone())
                    .with_attribute("cidrs", json!(cidrs))
                    .with_attribute(
                        "external",
                        json!(spec.get_config::<bool>("external").unwrap_or(false)),
                    )
                    .with_attribute(
                        "router",
                        spec.config.get("router").cloned().unwrap_or(Value::Null),
                    )
            }
            ResourceKind::Router => {
                let id = state.new_id(spec.kind);
                RemoteItem::new(spec.kind, id, spec.name.clone()).with_attribute(
                    "external_network",
                    spec.config
                        .get("external_network")
                        .cloned()
                        .unwrap_or(Value::Null),
                )
            }
            ResourceKind::SecurityGroup => {
                let id = state.new_id(spec.kind);
                RemoteItem::new(spec.kind, id, spec.name.clone())
                    .with_attribute(
                        "description",
                        spec.config.get("description").cloned().unwrap_or(json!("")),
                    )
                    .with_attribute(
                        "rules",
                        spec.config.get("rules").cloned().unwrap_or(json!([])),
                    )
            }
            ResourceKind::Flavor | ResourceKind::Image => {
                return Err(CloudError::NotSupported(format!(
                    "creating a {} on a stub cloud",
                    spec.kind
                )));
            }
        };

        tracing::debug!("[StubContext] created {} {}", item.kind, item.name);
        state.items.push(item.clone());
        Ok(item)
    }

    fn update(&self, kind: ResourceKind, id: &str, patch: &Value) -> Result<RemoteItem> {
        let mut state = self.state();
        Self::require_auth(&state)?;

        let index = state
            .find(kind, id)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("{} {}", kind, id)))?;
        let item = &mut state.items[index];
        if let Value::Object(fields) = patch {
            for (key, value) in fields {
                item.set_attribute(key.clone(), value.clone());
            }
        }
        Ok(item.clone())
    }

    fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome> {
        let mut state = self.state();
        Self::require_auth(&state)?;

        match state.find(kind, id) {
            Some(index) => {
                state.items.remove(index);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}
