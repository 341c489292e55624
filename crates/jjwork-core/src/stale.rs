//! Stale change-description detection.
//!
//! A description is stale when a change's content (diff from parent) has been
//! modified since the description was last written. Candidates come from one
//! `jj log` call over `trunk()..@ ~ empty()`; each candidate's evolution log
//! tells us where the description was last changed, and git-format patches of
//! the describe-time commit and the current commit are compared as content
//! fingerprints. Comparing actual diffs rather than rewrite counts avoids
//! false positives from rebases that move a change without altering it.
//!
//! Everything here is best-effort: any jj failure yields "nothing stale" so
//! the calling hook fails open.

use crate::jj::Jj;
use std::collections::BTreeMap;
use std::path::Path;

/// Revset selecting mutable, non-empty changes of the current stack.
pub const CANDIDATE_REVSET: &str = "trunk()..@ ~ empty()";

const CANDIDATE_TEMPLATE: &str =
    r#"change_id.short(12) ++ "\t" ++ commit_id ++ "\t" ++ if(description, "d", "e") ++ "\n""#;

const EVOLOG_TEMPLATE: &str = r#"commit_id ++ "\t" ++ description.first_line() ++ "\n""#;

/// Maximum evolution entries to inspect per change (sanity bound).
const MAX_EVOLOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleChange {
    pub change_id: String,
    /// Files whose diff-from-parent changed since the last describe.
    pub changed_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    change_id: String,
    commit_id: String,
    described: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EvoEntry {
    commit_id: String,
    description: String,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Find all stale changes in the stack at `cwd`. Empty on any jj failure.
pub fn find_stale(jj: &Jj, cwd: &Path) -> Vec<StaleChange> {
    let Some(text) = jj.log(cwd, CANDIDATE_REVSET, CANDIDATE_TEMPLATE) else {
        return Vec::new();
    };

    let mut stale = Vec::new();
    for cand in parse_candidates(&text) {
        if let Some(s) = check_candidate(jj, cwd, &cand) {
            stale.push(s);
        }
    }
    stale.dedup_by(|a, b| a.change_id == b.change_id);
    stale
}

fn check_candidate(jj: &Jj, cwd: &Path, cand: &Candidate) -> Option<StaleChange> {
    // Empty description on a non-empty change is always stale; report every
    // file in the current diff.
    if !cand.described {
        let fp = diff_fingerprint(&jj.diff_patch(cwd, &cand.commit_id)?);
        return Some(StaleChange {
            change_id: cand.change_id.clone(),
            changed_files: fp.into_keys().collect(),
        });
    }

    let mut entries = parse_evolog(&jj.evolog(cwd, &cand.change_id, EVOLOG_TEMPLATE)?);
    entries.truncate(MAX_EVOLOG_ENTRIES);
    // jj emits newest first; analysis wants chronological order.
    entries.reverse();

    // Single entry means the change was described at creation.
    if entries.len() < 2 {
        return None;
    }

    let described = describe_point(&entries);
    if described.commit_id == cand.commit_id {
        // The describe is the newest rewrite, nothing happened after it.
        return None;
    }

    let described_fp = diff_fingerprint(&jj.diff_patch(cwd, &described.commit_id)?);
    let current_fp = diff_fingerprint(&jj.diff_patch(cwd, &cand.commit_id)?);
    if described_fp == current_fp {
        return None;
    }

    Some(StaleChange {
        change_id: cand.change_id.clone(),
        changed_files: fingerprint_changes(&described_fp, &current_fp),
    })
}

/// The evolution entry at which the description was last changed. Falls back
/// to the first entry when the description never changed after creation.
fn describe_point(entries: &[EvoEntry]) -> &EvoEntry {
    for i in (1..entries.len()).rev() {
        if entries[i].description != entries[i - 1].description {
            return &entries[i];
        }
    }
    &entries[0]
}

// ---------------------------------------------------------------------------
// Record parsing
// ---------------------------------------------------------------------------

fn parse_candidates(text: &str) -> Vec<Candidate> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let change_id = parts.next()?.trim();
            let commit_id = parts.next()?.trim();
            let flag = parts.next()?.trim();
            if change_id.is_empty() || commit_id.is_empty() {
                return None;
            }
            Some(Candidate {
                change_id: change_id.to_string(),
                commit_id: commit_id.to_string(),
                described: flag == "d",
            })
        })
        .collect()
}

fn parse_evolog(text: &str) -> Vec<EvoEntry> {
    text.lines()
        .filter_map(|line| {
            let (commit_id, description) = line.split_once('\t')?;
            if commit_id.is_empty() {
                return None;
            }
            Some(EvoEntry {
                commit_id: commit_id.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diff fingerprints
// ---------------------------------------------------------------------------

/// Map of `path → per-file patch text` from a git-format patch. Two commits
/// have the same logical content iff their fingerprints are equal, regardless
/// of what parents they sit on.
fn diff_fingerprint(patch: &str) -> BTreeMap<String, String> {
    let mut fp = BTreeMap::new();
    let mut current: Option<(String, String)> = None;
    for line in patch.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some((path, body)) = current.take() {
                fp.insert(path, body);
            }
            // "a/<path> b/<path>" — take the b/ side.
            let path = rest
                .rsplit_once(" b/")
                .map(|(_, p)| p.to_string())
                .unwrap_or_else(|| rest.to_string());
            current = Some((path, String::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some((path, body)) = current {
        fp.insert(path, body);
    }
    fp
}

/// Paths whose per-file patch differs between two fingerprints.
fn fingerprint_changes(
    described: &BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut changed = Vec::new();
    for (path, cur) in current {
        match described.get(path) {
            Some(desc) if desc == cur => {}
            _ => changed.push(path.clone()),
        }
    }
    for path in described.keys() {
        if !current.contains_key(path) {
            changed.push(path.clone());
        }
    }
    changed.sort();
    changed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
