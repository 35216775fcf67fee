mod common;

use common::TestSystem;
use minicloud_cloud::{DeleteOutcome, RemoteItem, ResourceKind};
use minicloud_core::model::{Cluster, Flavor, Instance, Network, Router};
use minicloud_core::testing::{FakeContext, FakeDriver, Op, openstack_cloud};
use minicloud_core::{Entity, ListOptions, MiniCloudError, RemoteResource, Resolution};
use serde_json::json;
use std::sync::Arc;

fn network_item(id: &str, name: &str, external: bool) -> RemoteItem {
    RemoteItem::new(ResourceKind::Network, id, name)
        .with_attribute("cidrs", json!(["10.0.0.0/24"]))
        .with_attribute("external", json!(external))
}

#[test]
fn test_remote_listing_without_clouds_fails() {
    let system = TestSystem::persistent();
    let result = system.mc.networks().list_all();
    assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
}

#[test]
fn test_full_sync_mirrors_remote_set_sorted() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(network_item("n-2", "private", false));
    ctx.seed(network_item("n-1", "mgmt", false));
    ctx.seed(network_item("n-3", "public", true));

    let networks = system.mc.networks().list_all().unwrap();
    assert!(system.mc.networks().is_filled());
    let names: Vec<&str> = networks.iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["mgmt", "private", "public"]);
    assert!(networks.iter().all(|n| n.cloud.as_deref() == Some("lab")));
}

#[test]
fn test_add_then_get_returns_entity() {
    let system = TestSystem::with_cloud("lab");
    let added = system
        .mc
        .networks()
        .add_network(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    assert_eq!(added.cloud.as_deref(), Some("lab"));
    assert!(added.id.is_some());

    let found = system.mc.networks().get("private").unwrap().unwrap();
    assert_eq!(found.name, "private");
    assert_eq!(
        system.driver.context("lab").calls(Op::Create, ResourceKind::Network),
        1
    );
}

#[test]
fn test_duplicate_add_leaves_cache_unchanged() {
    let system = TestSystem::with_cloud("lab");
    let networks = system.mc.networks();
    networks
        .add(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    let before = networks.list(ListOptions::cache_only()).unwrap();

    let result = networks.add(Network::new("private", vec!["10.1.0.0/24".into()]));
    assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
    assert_eq!(networks.list(ListOptions::cache_only()).unwrap(), before);
    assert_eq!(
        system.driver.context("lab").calls(Op::Create, ResourceKind::Network),
        1
    );
}

#[test]
fn test_invalid_cidr_is_rejected() {
    let system = TestSystem::with_cloud("lab");
    let result = system
        .mc
        .networks()
        .add_network(Network::new("bad", vec!["10.0.0.0/40".into()]));
    assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
}

#[test]
fn test_remove_deletes_remotely_but_undeclare_does_not() {
    let system = TestSystem::with_cloud("lab");
    system.mc.add_cluster("web", "lab").unwrap();
    let instances = system.mc.instances();
    let ctx = system.driver.context("lab");

    let vm1 = instances
        .add(Instance::new("vm1").in_cluster("web").on_network("private"))
        .unwrap();
    let vm2 = instances
        .add(Instance::new("vm2").in_cluster("web").on_network("private"))
        .unwrap();

    assert!(instances.undeclare(&vm1).unwrap());
    assert!(instances.get("vm1").unwrap().is_none());
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Instance), 0);

    assert!(instances.remove(&vm2).unwrap());
    assert!(instances.get("vm2").unwrap().is_none());
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Instance), 1);
    assert_eq!(ctx.items(ResourceKind::Instance).len(), 1);
}

#[test]
fn test_instance_resolves_cloud_through_cluster() {
    let system = TestSystem::with_cloud("lab");
    system.mc.clouds().add(openstack_cloud("prod")).unwrap();
    system.mc.add_cluster("edge", "prod").unwrap();

    let vm = system
        .mc
        .instances()
        .add(Instance::new("vm").in_cluster("edge"))
        .unwrap();
    assert_eq!(vm.cloud.as_deref(), Some("prod"));
    assert_eq!(
        system.driver.context("prod").calls(Op::Create, ResourceKind::Instance),
        1
    );
    assert_eq!(
        system.driver.context("lab").calls(Op::Create, ResourceKind::Instance),
        0
    );
}

#[test]
fn test_resolved_cloud_is_bound_on_the_entity() {
    let system = TestSystem::with_cloud("lab");
    system.mc.clouds().add(openstack_cloud("prod")).unwrap();
    system.mc.add_cluster("edge", "prod").unwrap();

    let vm = Instance::new("vm").in_cluster("edge");
    let resolver = system.mc.resolver();
    assert!(matches!(
        resolver.resolve(&vm).unwrap(),
        Resolution::ViaParent { .. }
    ));

    let bound = system.mc.instances().source().bind(&vm).unwrap();
    assert_eq!(bound.cloud_name(), Some("prod"));
    assert_eq!(
        resolver.resolve(&bound).unwrap(),
        Resolution::Direct("prod".to_string())
    );

    let vm = system.mc.instances().add(bound).unwrap();
    assert!(system.mc.instances().remove(&vm).unwrap());
    assert_eq!(
        system.driver.context("prod").calls(Op::Delete, ResourceKind::Instance),
        1
    );
}

#[test]
fn test_unresolvable_context_is_an_integrity_error() {
    let system = TestSystem::with_cloud("lab");
    system.mc.clouds().add(openstack_cloud("prod")).unwrap();

    // two clouds, no binding, no cluster
    let result = system.mc.routers().add(Router::new("gw"));
    assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
}

#[test]
fn test_delete_tolerates_gone_and_server_errors() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(network_item("n-1", "a", false));
    ctx.seed(network_item("n-2", "b", false));
    let networks = system.mc.networks();

    ctx.respond_to_deletes(DeleteOutcome::NotFound);
    let a = networks.get("a").unwrap().unwrap();
    assert!(networks.remove(&a).unwrap());

    ctx.respond_to_deletes(DeleteOutcome::ServerError("503".into()));
    let b = networks.get("b").unwrap().unwrap();
    assert!(networks.remove(&b).unwrap());

    // both are forgotten even though the remote side still lists them
    assert!(networks.list(ListOptions::cache_only()).unwrap().is_empty());
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Network), 2);
}

#[test]
fn test_external_network_is_not_deleted() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(network_item("n-1", "public", true));

    let public = system.mc.networks().get("public").unwrap().unwrap();
    assert!(!system.mc.networks().remove(&public).unwrap());
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Network), 0);
    assert_eq!(ctx.items(ResourceKind::Network).len(), 1);
}

#[test]
fn test_write_errors_propagate() {
    let system = TestSystem::with_cloud("lab");
    system.driver.context("lab").seed(network_item("n-1", "taken", false));

    // skipping the local check leaves the collision to the remote side
    let result = system
        .mc
        .networks()
        .add_unchecked(Network::new("taken", vec![]));
    assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
}

#[test]
fn test_unauthenticated_cloud_contributes_nothing() {
    let driver = Arc::new(FakeDriver::new());
    driver.insert("lab", FakeContext::rejecting("lab"));
    let mc = common::in_memory(&driver);
    mc.clouds().add(openstack_cloud("lab")).unwrap();

    assert!(mc.networks().list_all().unwrap().is_empty());

    let result = mc.networks().add(Network::new("private", vec![]));
    assert!(matches!(result, Err(MiniCloudError::NotAuthorized(_))));
}

#[test]
fn test_failing_cloud_is_skipped_in_listings() {
    let system = TestSystem::with_cloud("lab");
    system.mc.clouds().add(openstack_cloud("prod")).unwrap();
    system.driver.context("lab").seed(network_item("n-1", "lab-net", false));
    system.driver.context("prod").seed(network_item("n-1", "prod-net", false));
    system.driver.context("lab").fail_lists(true);

    let names: Vec<String> = system
        .mc
        .networks()
        .list_all()
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["prod-net".to_string()]);
}

#[test]
fn test_never_evict_deep_listing_makes_no_remote_calls() {
    let driver = Arc::new(FakeDriver::new());
    let mc = common::in_memory(&driver);
    mc.clouds().add(openstack_cloud("lab")).unwrap();
    let ctx = driver.context("lab");
    ctx.seed(network_item("n-1", "private", false));

    assert!(mc.networks().policy().never_evict());
    mc.networks().list(ListOptions::deep()).unwrap();
    let calls = ctx.total_calls();

    assert_eq!(mc.networks().list(ListOptions::deep()).unwrap().len(), 1);
    assert_eq!(ctx.total_calls(), calls);
}

#[test]
fn test_evicting_deep_listing_refreshes() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    let networks = system.mc.networks();

    assert!(!networks.policy().never_evict());
    networks.list_all().unwrap();
    ctx.seed(network_item("n-9", "late", false));
    assert!(networks.list_all().unwrap().is_empty());

    assert_eq!(networks.list(ListOptions::deep()).unwrap().len(), 1);
    assert_eq!(ctx.calls(Op::List, ResourceKind::Network), 2);
}

#[test]
fn test_flavors_trust_filled_cache_and_are_read_only() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    for (i, name) in ["m1.large", "m1.tiny", "custom", "m1.xlarge"].iter().enumerate() {
        ctx.seed(RemoteItem::new(ResourceKind::Flavor, format!("f-{}", i), *name));
    }

    let flavors = system.mc.flavors();
    let names: Vec<String> = flavors.list_all().unwrap().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["m1.tiny", "m1.large", "m1.xlarge", "custom"]);

    flavors.list(ListOptions::deep()).unwrap();
    assert_eq!(ctx.calls(Op::List, ResourceKind::Flavor), 1);

    let tiny = flavors.get("m1.tiny").unwrap().unwrap();
    assert!(!flavors.remove(&tiny).unwrap());
    let custom = Flavor {
        name: "new".into(),
        ..Default::default()
    };
    assert!(flavors.add(custom).is_err());
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Flavor), 0);
}

#[test]
fn test_router_uplink_and_network_attach() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(network_item("n-1", "public", true));

    let public = system.mc.networks().get("public").unwrap().unwrap();
    let private = system
        .mc
        .networks()
        .add_network(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    let router = system.mc.routers().add(Router::new("gw")).unwrap();

    let router = system.mc.routers().uplink(&router, &public).unwrap().unwrap();
    assert_eq!(router.external_network.as_deref(), Some("public"));
    assert!(system.mc.routers().uplink(&router, &private).is_err());

    system.mc.networks().attach(&private, &router).unwrap();
    let attached = system.mc.networks().by_router(Some("gw"), false).unwrap();
    assert_eq!(attached.len(), 1);
    assert!(
        system
            .mc
            .networks()
            .by_router(None, false)
            .unwrap()
            .iter()
            .all(|n| n.name == "public")
    );

    let router = system.mc.routers().unlink(&router).unwrap().unwrap();
    assert!(router.external_network.is_none());
}

#[test]
fn test_ssh_security_group_sorts_first() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(RemoteItem::new(ResourceKind::SecurityGroup, "sg-1", "default"));

    let ssh = system.mc.security_groups().create_ssh_group(None).unwrap();
    assert_eq!(ssh.rules.len(), 1);
    assert_eq!(ssh.rules[0].port_min, 22);

    let names: Vec<String> = system
        .mc
        .security_groups()
        .list_all()
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["public_ssh".to_string(), "default".to_string()]);
}

#[test]
fn test_instance_queries() {
    let system = TestSystem::with_cloud("lab");
    let ctx = system.driver.context("lab");
    ctx.seed(
        RemoteItem::new(ResourceKind::Instance, "i-1", "vm1")
            .with_attribute("network", json!("private"))
            .with_attribute("ip", json!("10.0.0.2"))
            .with_attribute("status", json!("ACTIVE")),
    );
    ctx.seed(
        RemoteItem::new(ResourceKind::Instance, "i-2", "vm2")
            .with_attribute("cluster", json!("web"))
            .with_attribute("network", json!("mgmt"))
            .with_attribute("status", json!("ACTIVE")),
    );
    ctx.seed(
        RemoteItem::new(ResourceKind::Instance, "i-3", "vm3").with_attribute("status", json!("BUILD")),
    );

    let instances = system.mc.instances();
    assert_eq!(instances.list_all().unwrap().len(), 2);
    assert_eq!(instances.by_cluster("lab.UNNAMED", false).unwrap()[0].name, "vm1");
    assert_eq!(instances.by_network("mgmt", false).unwrap()[0].name, "vm2");
    assert_eq!(instances.by_ip("10.0.0.2").unwrap().unwrap().name, "vm1");
    assert!(instances.by_ip("10.0.0.9").unwrap().is_none());
}

#[test]
fn test_cloud_add_creates_unnamed_cluster() {
    let system = TestSystem::with_cloud("lab");
    let clusters = system.mc.clusters().by_cloud("lab").unwrap();
    assert_eq!(clusters, vec![Cluster::unnamed("lab")]);

    // empty clusters do not count as children of a cloud
    assert!(!system.mc.clouds().has_children("lab").unwrap());

    system.mc.instances().add(Instance::new("vm")).unwrap();
    assert!(system.mc.clouds().has_children("lab").unwrap());
    assert!(system.mc.clusters().has_children("lab.UNNAMED").unwrap());
}

#[test]
fn test_unnamed_cluster_name_is_reserved() {
    let system = TestSystem::with_cloud("lab");
    assert!(system.mc.add_cluster("x.UNNAMED", "lab").is_err());
    assert!(system.mc.add_cluster("web", "nowhere").is_err());
}

#[test]
fn test_deep_remove_of_cloud_forgets_descendants() {
    let system = TestSystem::with_cloud("lab");
    system.mc.add_cluster("web", "lab").unwrap();
    system
        .mc
        .instances()
        .add(Instance::new("vm").in_cluster("web"))
        .unwrap();
    let ctx = system.driver.context("lab");

    let lab = system.mc.clouds().get("lab").unwrap().unwrap();
    assert!(system.mc.clouds().deep_remove(&lab).unwrap());

    assert!(system.mc.clouds().list_all().unwrap().is_empty());
    assert!(system.mc.clusters().list_all().unwrap().is_empty());
    assert!(
        system
            .mc
            .instances()
            .list(ListOptions::cache_only())
            .unwrap()
            .is_empty()
    );
    // undeclared, not deleted
    assert_eq!(ctx.calls(Op::Delete, ResourceKind::Instance), 0);
    assert_eq!(ctx.items(ResourceKind::Instance).len(), 1);
}

#[test]
fn test_clouds_and_clusters_survive_reopen() {
    let system = TestSystem::with_cloud("lab");
    system.mc.add_cluster("web", "lab").unwrap();

    let reopened = system.reopen();
    assert_eq!(reopened.clouds().list_all().unwrap().len(), 1);
    let names: Vec<String> = reopened
        .clusters()
        .list_all()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["lab.UNNAMED".to_string(), "web".to_string()]);
}

#[test]
fn test_clear_with_cleanup_wipes_everything() {
    let system = TestSystem::with_cloud("lab");
    system.mc.add_cluster("web", "lab").unwrap();
    system
        .mc
        .instances()
        .add(Instance::new("vm").in_cluster("web"))
        .unwrap();
    system
        .mc
        .networks()
        .add(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    let ctx = system.driver.context("lab");

    system.mc.clear(true, true).unwrap();

    assert!(ctx.items(ResourceKind::Instance).is_empty());
    assert!(ctx.items(ResourceKind::Network).is_empty());
    assert_eq!(system.mc.clouds().count().unwrap(), 0);
    assert!(system.reopen().clusters().list_all().unwrap().is_empty());
}

#[test]
fn test_get_cloud_requires_a_single_cloud() {
    let system = TestSystem::with_cloud("lab");
    assert_eq!(system.mc.get_cloud().unwrap().unwrap().name, "lab");

    system.mc.clouds().add(openstack_cloud("prod")).unwrap();
    assert!(system.mc.get_cloud().is_err());
}
