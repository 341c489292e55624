//! Typed settings document and the tagged-entry merge.
//!
//! The host runtime's `settings.json` maps hook event names to ordered lists
//! of entries. jjwork owns only the entries carrying its ownership marker
//! (`"managedBy": "jjwork"`); everything else in the document round-trips
//! verbatim through flattened passthrough maps, so foreign tools' entries are
//! never altered or removed.

use crate::error::Result;
use crate::io;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Ownership marker value identifying entries installed by this tool.
pub const OWNER: &str = "jjwork";

/// Timeout written into each installed command descriptor (seconds).
/// Enforced by the host runtime, not by jjwork.
pub const HOOK_TIMEOUT_SECS: u64 = 600;

/// Event fired when the host runtime needs an isolated worktree.
pub const CREATE_EVENT: &str = "WorktreeCreate";
/// Event fired when the host runtime is done with a worktree.
pub const REMOVE_EVENT: &str = "WorktreeRemove";

/// The two event lists jjwork manages.
pub const MANAGED_EVENTS: &[&str] = &[CREATE_EVENT, REMOVE_EVENT];

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<BTreeMap<String, Vec<HookEntry>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One element of an event list. Entries without a parseable managed shape
/// (no marker field, or any structure we don't recognize) are kept as raw
/// JSON and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookEntry {
    Managed(ManagedEntry),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedEntry {
    #[serde(rename = "managedBy")]
    pub managed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    pub hooks: Vec<HookCommand>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Changed,
    Unchanged,
}

impl MergeOutcome {
    pub fn changed(self) -> bool {
        self == MergeOutcome::Changed
    }
}

impl HookEntry {
    /// An entry is ours when it carries our ownership marker, even if the
    /// rest of it no longer parses as a managed shape (hand-edited files).
    fn is_owned(&self) -> bool {
        match self {
            HookEntry::Managed(m) => m.managed_by == OWNER,
            HookEntry::Other(v) => v.get("managedBy").and_then(Value::as_str) == Some(OWNER),
        }
    }
}

fn owned_entry(command: &str) -> HookEntry {
    HookEntry::Managed(ManagedEntry {
        managed_by: OWNER.to_string(),
        matcher: None,
        hooks: vec![HookCommand {
            kind: "command".to_string(),
            command: command.to_string(),
            timeout: Some(HOOK_TIMEOUT_SECS),
            extra: Map::new(),
        }],
        extra: Map::new(),
    })
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

impl Settings {
    /// Parse the settings file; a missing or empty file is an empty document.
    pub fn load(path: &Path) -> Result<Settings> {
        match io::read_to_string_opt(path)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Settings::default()),
        }
    }

    /// Write the document back as a whole-file atomic replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        io::atomic_write(path, text.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Merge operations
    // -----------------------------------------------------------------------

    /// Install exactly one owned entry per managed event, replacing any prior
    /// owned entries. Returns [`MergeOutcome::Unchanged`] when the document
    /// already contains exactly these entries.
    pub fn install(&mut self, create_command: &str, remove_command: &str) -> MergeOutcome {
        let before = self.clone();
        self.strip_owned();
        let hooks = self.hooks.get_or_insert_with(BTreeMap::new);
        for (event, command) in [(CREATE_EVENT, create_command), (REMOVE_EVENT, remove_command)] {
            hooks
                .entry(event.to_string())
                .or_default()
                .push(owned_entry(command));
        }
        if *self == before {
            MergeOutcome::Unchanged
        } else {
            MergeOutcome::Changed
        }
    }

    /// Remove every owned entry. An event list emptied by the removal is
    /// deleted; a `hooks` object emptied by that is deleted too.
    pub fn uninstall(&mut self) -> MergeOutcome {
        let before = self.clone();
        self.strip_owned();
        if *self == before {
            MergeOutcome::Unchanged
        } else {
            MergeOutcome::Changed
        }
    }

    fn strip_owned(&mut self) {
        let Some(hooks) = self.hooks.as_mut() else {
            return;
        };
        let mut pruned_list = false;
        for event in MANAGED_EVENTS {
            let Some(entries) = hooks.get_mut(*event) else {
                continue;
            };
            let had = entries.len();
            entries.retain(|e| !e.is_owned());
            // Only prune a list our removal emptied; a pre-existing empty
            // list is foreign state and stays.
            if entries.is_empty() && had > 0 {
                hooks.remove(*event);
                pruned_list = true;
            }
        }
        if pruned_list && hooks.is_empty() {
            self.hooks = None;
        }
    }

    /// The commands currently installed per managed event, for `status`.
    pub fn owned_commands(&self) -> Vec<(String, String)> {
        let Some(hooks) = self.hooks.as_ref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for event in MANAGED_EVENTS {
            let Some(entries) = hooks.get(*event) else {
                continue;
            };
            for entry in entries {
                if let HookEntry::Managed(m) = entry {
                    if m.managed_by == OWNER {
                        for cmd in &m.hooks {
                            out.push((event.to_string(), cmd.command.clone()));
                        }
                    }
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Settings {
        serde_json::from_value(value).unwrap()
    }

    fn installed() -> Settings {
        let mut s = Settings::default();
        s.install("jjwork hook worktree-create", "jjwork hook worktree-remove");
        s
    }

    #[test]
    fn install_into_empty_document() {
        let s = installed();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["hooks"][CREATE_EVENT].as_array().unwrap().len(), 1);
        assert_eq!(v["hooks"][REMOVE_EVENT].as_array().unwrap().len(), 1);
        assert_eq!(v["hooks"][CREATE_EVENT][0]["managedBy"], json!(OWNER));
        assert_eq!(
            v["hooks"][CREATE_EVENT][0]["hooks"][0]["timeout"],
            json!(HOOK_TIMEOUT_SECS)
        );
        assert_eq!(v["hooks"][CREATE_EVENT][0]["hooks"][0]["type"], json!("command"));
    }

    #[test]
    fn install_twice_is_unchanged() {
        let mut s = installed();
        let outcome = s.install("jjwork hook worktree-create", "jjwork hook worktree-remove");
        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert_eq!(s, installed());
    }

    #[test]
    fn install_replaces_stale_owned_entry() {
        let mut s = installed();
        let outcome = s.install("/new/path hook worktree-create", "/new/path hook worktree-remove");
        assert_eq!(outcome, MergeOutcome::Changed);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["hooks"][CREATE_EVENT].as_array().unwrap().len(), 1);
        assert_eq!(
            v["hooks"][CREATE_EVENT][0]["hooks"][0]["command"],
            json!("/new/path hook worktree-create")
        );
    }

    #[test]
    fn install_preserves_foreign_entries_and_keys() {
        let mut s = doc(json!({
            "theme": "dark",
            "hooks": {
                "WorktreeCreate": [
                    {"hooks": [{"type": "command", "command": "other-tool create"}]}
                ],
                "Stop": [
                    {"hooks": [{"type": "command", "command": "other-tool stop"}]}
                ]
            }
        }));
        let before_foreign = serde_json::to_value(&s).unwrap();
        s.install("a", "b");
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["theme"], json!("dark"));
        assert_eq!(v["hooks"]["Stop"], before_foreign["hooks"]["Stop"]);
        assert_eq!(
            v["hooks"][CREATE_EVENT][0],
            before_foreign["hooks"][CREATE_EVENT][0]
        );
        assert_eq!(v["hooks"][CREATE_EVENT].as_array().unwrap().len(), 2);
    }

    #[test]
    fn install_preserves_oddly_shaped_foreign_entries() {
        let mut s = doc(json!({
            "hooks": {
                "WorktreeCreate": ["just a string", {"weird": true}]
            }
        }));
        s.install("a", "b");
        let v = serde_json::to_value(&s).unwrap();
        let list = v["hooks"][CREATE_EVENT].as_array().unwrap();
        assert_eq!(list[0], json!("just a string"));
        assert_eq!(list[1], json!({"weird": true}));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn install_respects_foreign_ownership_markers() {
        let mut s = doc(json!({
            "hooks": {
                "WorktreeRemove": [
                    {"managedBy": "other-tool", "hooks": [{"type": "command", "command": "x"}]}
                ]
            }
        }));
        s.install("a", "b");
        let v = serde_json::to_value(&s).unwrap();
        let list = v["hooks"][REMOVE_EVENT].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["managedBy"], json!("other-tool"));
    }

    #[test]
    fn uninstall_removes_owned_and_prunes_containers() {
        let mut s = installed();
        let outcome = s.uninstall();
        assert_eq!(outcome, MergeOutcome::Changed);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({}));
    }

    #[test]
    fn uninstall_keeps_foreign_entries_and_lists() {
        let mut s = doc(json!({
            "hooks": {
                "WorktreeCreate": [
                    {"hooks": [{"type": "command", "command": "other-tool create"}]}
                ]
            }
        }));
        s.install("a", "b");
        s.uninstall();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["hooks"][CREATE_EVENT].as_array().unwrap().len(), 1);
        assert_eq!(
            v["hooks"][CREATE_EVENT][0]["hooks"][0]["command"],
            json!("other-tool create")
        );
        // our list under WorktreeRemove was emptied, so it is gone
        assert!(v["hooks"].get(REMOVE_EVENT).is_none());
    }

    #[test]
    fn uninstall_removes_hand_edited_owned_entries() {
        // A non-integer timeout breaks the managed shape, but the marker
        // still makes the entry ours to remove.
        let mut s = doc(json!({
            "hooks": {
                "WorktreeCreate": [
                    {
                        "managedBy": OWNER,
                        "hooks": [{"type": "command", "command": "jjwork hook worktree-create", "timeout": "600"}]
                    }
                ]
            }
        }));
        let outcome = s.uninstall();
        assert_eq!(outcome, MergeOutcome::Changed);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({}));
    }

    #[test]
    fn uninstall_on_clean_document_is_noop() {
        let mut s = doc(json!({"hooks": {"Stop": []}, "model": "foo"}));
        let outcome = s.uninstall();
        assert_eq!(outcome, MergeOutcome::Unchanged);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, json!({"hooks": {"Stop": []}, "model": "foo"}));
    }

    #[test]
    fn preexisting_empty_list_is_not_pruned() {
        let mut s = doc(json!({"hooks": {"WorktreeCreate": []}}));
        let outcome = s.uninstall();
        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"hooks": {"WorktreeCreate": []}})
        );
    }

    #[test]
    fn owned_commands_reports_installed_entries() {
        let s = installed();
        let cmds = s.owned_commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].0, CREATE_EVENT);
        assert!(cmds[0].1.ends_with("worktree-create"));
    }

    #[test]
    fn load_missing_file_is_empty_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let s = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".claude/settings.json");
        let s = installed();
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
    }
}
