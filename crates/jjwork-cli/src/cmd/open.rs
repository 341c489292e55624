use anyhow::Context;
use jjwork_core::jj::Jj;
use jjwork_core::workspace;
use std::process::Command;

/// Open (or focus) a zellij tab in the named workspace's directory.
pub fn run(name: &str) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let dest = workspace::dir_of(&Jj::new(), name, &cwd)
        .with_context(|| format!("workspace '{name}' is not set up"))?;

    let status = Command::new("zellij")
        .args(["action", "new-tab", "--name", name, "--cwd"])
        .arg(&dest)
        .status()
        .context("failed to run zellij (is it installed and running?)")?;
    if !status.success() {
        anyhow::bail!("zellij exited with {status}");
    }

    println!("Opened tab '{}' in {}", name, dest.display());
    Ok(())
}
