use crate::output::print_json;
use anyhow::Context;
use jjwork_core::paths;
use jjwork_core::settings::Settings;
use std::path::Path;

pub fn run(settings_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let path = paths::settings_path(settings_path)?;
    let jj_found = which::which("jj").is_ok();
    let zellij_found = which::which("zellij").is_ok();
    let settings_exists = path.exists();

    let installed = if settings_exists {
        Settings::load(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .owned_commands()
    } else {
        Vec::new()
    };

    if json {
        print_json(&serde_json::json!({
            "jj": jj_found,
            "zellij": zellij_found,
            "settings": path.display().to_string(),
            "settings_exists": settings_exists,
            "hooks": installed
                .iter()
                .map(|(event, command)| serde_json::json!({
                    "event": event,
                    "command": command,
                }))
                .collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    let mark = |ok: bool| if ok { "found" } else { "missing" };
    println!("jj:       {}", mark(jj_found));
    println!("zellij:   {}", mark(zellij_found));
    println!(
        "settings: {} ({})",
        path.display(),
        if settings_exists { "exists" } else { "missing" }
    );
    if installed.is_empty() {
        println!("hooks:    none installed");
    } else {
        for (event, command) in &installed {
            println!("hooks:    {event} -> {command}");
        }
    }

    Ok(())
}
