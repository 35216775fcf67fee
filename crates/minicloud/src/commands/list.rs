use crate::Kind;
use crate::utils::{Session, print_entities};
use minicloud_core::ListOptions;

pub fn handle(session: &Session, kind: Kind, deep: bool) -> anyhow::Result<()> {
    let options = ListOptions::default().with_deep(deep);
    let mc = &session.mc;
    match kind {
        Kind::Clouds => print_entities(&mc.clouds().list(options)?),
        Kind::Clusters => print_entities(&mc.clusters().list(options)?),
        Kind::Instances => print_entities(&mc.instances().list(options)?),
        Kind::Networks => print_entities(&mc.networks().list(options)?),
        Kind::Routers => print_entities(&mc.routers().list(options)?),
        Kind::SecurityGroups => print_entities(&mc.security_groups().list(options)?),
        Kind::Flavors => print_entities(&mc.flavors().list(options)?),
        Kind::Images => print_entities(&mc.images().list(options)?),
    }
    Ok(())
}
