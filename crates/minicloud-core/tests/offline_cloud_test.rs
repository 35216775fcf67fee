mod common;

use common::{TestSystem, stub_cloud};
use minicloud_cloud_stub::{STUB_FLAVOR, STUB_IMAGE, STUB_SECURITY_GROUP};
use minicloud_core::model::{Instance, Network};
use minicloud_core::{ListOptions, OfflineCloudState};

#[test]
fn test_stub_cloud_makes_caches_permanent() {
    let system = TestSystem::persistent();
    let networks = system.mc.networks();
    assert!(!networks.policy().never_evict());

    system.mc.clouds().add(stub_cloud("stub")).unwrap();
    assert_eq!(
        system.mc.clouds().offline_marker().state(),
        OfflineCloudState::Present("stub".to_string())
    );
    assert!(networks.policy().offline_cloud_present());
    assert!(!networks.policy().without_persistence());
    assert!(networks.policy().never_evict());

    networks
        .add(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    networks.clear_cache();
    assert!(networks.is_filled());
    assert_eq!(networks.list(ListOptions::deep()).unwrap().len(), 1);
}

#[test]
fn test_marker_is_primed_on_open() {
    let system = TestSystem::persistent();
    assert_eq!(
        system.mc.clouds().offline_marker().state(),
        OfflineCloudState::Absent
    );
    system.mc.clouds().add(stub_cloud("stub")).unwrap();

    let reopened = system.reopen();
    assert!(reopened.clouds().offline_marker().is_present());
    assert!(reopened.instances().policy().never_evict());
}

#[test]
fn test_removing_stub_cloud_clears_marker() {
    let system = TestSystem::persistent();
    system.mc.clouds().add(stub_cloud("stub")).unwrap();
    let stub = system.mc.clouds().get("stub").unwrap().unwrap();

    assert!(system.mc.clouds().deep_remove(&stub).unwrap());
    assert_eq!(
        system.mc.clouds().offline_marker().state(),
        OfflineCloudState::Absent
    );
    assert!(!system.mc.networks().policy().never_evict());
}

#[test]
fn test_stub_cloud_serves_catalog_and_instances() {
    let system = TestSystem::persistent();
    system.mc.clouds().add(stub_cloud("stub")).unwrap();

    let flavors = system.mc.flavors().list_all().unwrap();
    assert_eq!(flavors[0].name, STUB_FLAVOR);
    assert_eq!(system.mc.images().list_all().unwrap()[0].name, STUB_IMAGE);
    assert_eq!(
        system.mc.security_groups().list_all().unwrap()[0].name,
        STUB_SECURITY_GROUP
    );

    system
        .mc
        .networks()
        .add(Network::new("private", vec!["10.0.0.0/24".into()]))
        .unwrap();
    let vm = system
        .mc
        .instances()
        .add(
            Instance::new("vm")
                .on_network("private")
                .with_flavor(STUB_FLAVOR)
                .with_image(STUB_IMAGE),
        )
        .unwrap();
    assert_eq!(vm.ip.as_deref(), Some("10.0.0.2"));
    assert_eq!(vm.cluster_name.as_deref(), Some("stub.UNNAMED"));
    assert!(system.mc.clouds().has_children("stub").unwrap());
}
