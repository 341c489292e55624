use crate::output::print_json;
use anyhow::Context;
use jjwork_core::paths;
use jjwork_core::settings::Settings;
use std::path::Path;

pub fn run(settings_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let path = paths::settings_path(settings_path)?;
    let mut settings = Settings::load(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let outcome = settings.uninstall();

    if outcome.changed() {
        settings
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if json {
        print_json(&serde_json::json!({
            "settings": path.display().to_string(),
            "changed": outcome.changed(),
        }))?;
    } else if outcome.changed() {
        println!("Removed worktree hooks from {}", path.display());
    } else {
        println!("No worktree hooks installed in {}", path.display());
    }

    Ok(())
}
