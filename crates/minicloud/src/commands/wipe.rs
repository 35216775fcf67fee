use crate::utils::Session;
use colored::Colorize;

pub fn handle(session: &Session, yes: bool, clouds: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("wipe deletes every resource of the deployment, pass --yes to confirm");
    }

    let removed = session.mc.clear(true, clouds)?;
    println!("{} Removed {} entities", "✓".green(), removed);
    Ok(())
}
