//! Text diffs for change previews

use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Line counts of a text diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStat {
    pub added: usize,
    pub removed: usize,
}

/// Unified diff from the persisted content to the rendered content.
///
/// Absent previous content diffs against the empty string. Returns an
/// empty string when both sides are identical.
pub fn unified_diff(path: &Path, previous: Option<&str>, current: &str) -> String {
    let old = previous.unwrap_or("");
    if old == current && previous.is_some() {
        return String::new();
    }

    let old_header = match previous {
        Some(_) => format!("a{}", path.display()),
        None => "/dev/null".to_string(),
    };
    let new_header = format!("b{}", path.display());

    TextDiff::from_lines(old, current)
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string()
}

pub fn diff_stat(previous: Option<&str>, current: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for change in TextDiff::from_lines(previous.unwrap_or(""), current).iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stat.added += 1,
            ChangeTag::Delete => stat.removed += 1,
            ChangeTag::Equal => {}
        }
    }
    stat
}
