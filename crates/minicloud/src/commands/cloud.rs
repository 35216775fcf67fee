use crate::utils::Session;
use colored::Colorize;
use minicloud_cloud::CloudType;
use minicloud_config::{CloudDefaults, StoreSettings};
use minicloud_core::model::Cloud;

fn cloud_from_defaults(defaults: &CloudDefaults, name: Option<String>) -> anyhow::Result<Cloud> {
    Ok(Cloud {
        name: name.unwrap_or_else(|| defaults.name.clone()),
        cloud_type: defaults.cloud_type.parse::<CloudType>()?,
        version: defaults.version.clone(),
        location: defaults.location.clone(),
        auth_url: defaults.auth_url.clone(),
        tenant: defaults.tenant.clone(),
        username: defaults.username.clone(),
        password: defaults.password.clone(),
        user_domain_id: defaults.user_domain_id.clone(),
        project_domain_id: defaults.project_domain_id.clone(),
    })
}

pub fn configure(session: &Session, stub: bool, name: Option<String>) -> anyhow::Result<()> {
    let cloud = if stub {
        Cloud::stub(name.unwrap_or_else(|| "stub".to_string()))
    } else {
        cloud_from_defaults(&session.settings.cloud, name)?
    };

    let cloud = session.mc.clouds().add(cloud)?;
    println!("{} Configured", "✓".green());
    println!("{}", cloud.details());
    Ok(())
}

pub fn show(session: &Session) -> anyhow::Result<()> {
    match &session.settings.source {
        Some(path) => println!("Settings: {}", path.display().to_string().cyan()),
        None => println!("Settings: {}", "(defaults)".dimmed()),
    }
    match &session.settings.store {
        StoreSettings::File { path } if session.mc.database().is_persistent() => {
            println!("Store: {}", path.display().to_string().cyan())
        }
        _ => println!("Store: {}", "memory".cyan()),
    }

    let clouds = session.mc.clouds().list_all()?;
    if clouds.is_empty() {
        println!();
        println!("{}", "No cloud configured.".yellow());
        println!("Run {} to add one.", "minicloud configure".cyan());
        return Ok(());
    }

    for cloud in clouds {
        println!();
        println!("{}", cloud.details());
        for cluster in session.mc.clusters().by_cloud(&cloud.name)? {
            if cluster.is_unnamed() && !session.settings.show_unnamed_clusters {
                continue;
            }
            println!("  - Cluster: {}", cluster.name.cyan());
        }
    }
    Ok(())
}

pub fn unconfigure(session: &Session, name: Option<&str>) -> anyhow::Result<()> {
    let name = session.cloud_name(name)?;
    let cloud = session.require_cloud(&name)?;
    session.mc.clouds().deep_undeclare(&cloud)?;
    println!("{} Unconfigured {}", "✓".green(), cloud.name);
    Ok(())
}
