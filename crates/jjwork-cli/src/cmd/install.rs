use crate::output::print_json;
use anyhow::Context;
use jjwork_core::paths;
use jjwork_core::settings::Settings;
use std::path::Path;

/// The command strings written into the settings entries: this binary (or an
/// explicit `--bin` override) invoking its own hook handlers.
fn hook_commands(bin: Option<&str>) -> (String, String) {
    let bin = match bin {
        Some(b) => b.to_string(),
        None => std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "jjwork".to_string()),
    };
    let bin = shell_quote(&bin);
    (
        format!("{bin} hook worktree-create"),
        format!("{bin} hook worktree-remove"),
    )
}

/// Quote a binary path for the shell the host runtime hands the command to.
/// Plain paths stay bare; anything else is single-quoted.
fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+'));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

pub fn run(settings_path: Option<&Path>, bin: Option<&str>, json: bool) -> anyhow::Result<()> {
    let path = paths::settings_path(settings_path)?;
    let mut settings = Settings::load(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let (create_cmd, remove_cmd) = hook_commands(bin);
    let outcome = settings.install(&create_cmd, &remove_cmd);

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
        println!("Installed worktree hooks into {}", path.display());
    } else {
        println!("Worktree hooks already installed in {}", path.display());
    }

    Ok(())
}
