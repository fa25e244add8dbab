//! Change detection for rendered files
//!
//! Compares rendered content against what is currently persisted and
//! collapses any number of changes into a single restart request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rsyslog_fs::checksum::compute_content_checksum;
use serde::{Deserialize, Serialize};

use crate::render::{LogicalFile, RenderedFile};

/// How a rendered file differs from its persisted counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// Persisted content is byte-identical
    Unchanged,
    /// Nothing was persisted before
    Created,
    /// Persisted content differs
    Modified,
}

/// Outcome of comparing one rendered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub file: LogicalFile,
    pub path: PathBuf,
    pub status: ChangeStatus,
    /// Checksum of the persisted content, if any
    pub previous_checksum: Option<String>,
    pub current_checksum: String,
}

impl ChangeEvent {
    /// Compare by exact string equality.
    pub fn compare(rendered: &RenderedFile, previous: Option<&str>) -> Self {
        let status = match previous {
            None => ChangeStatus::Created,
            Some(old) if old == rendered.content => ChangeStatus::Unchanged,
            Some(_) => ChangeStatus::Modified,
        };

        Self {
            file: rendered.id,
            path: rendered.path.clone(),
            status,
            previous_checksum: previous.map(compute_content_checksum),
            current_checksum: compute_content_checksum(&rendered.content),
        }
    }

    pub fn changed(&self) -> bool {
        self.status != ChangeStatus::Unchanged
    }
}

/// Result of a notifier pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    /// Changed files, in load order
    pub changes: Vec<ChangeEvent>,
    /// Files whose persisted content already matches
    pub unchanged: Vec<LogicalFile>,
    /// OR over every change event
    pub restart_requested: bool,
}

impl ChangeReport {
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changed_files(&self) -> impl Iterator<Item = LogicalFile> + '_ {
        self.changes.iter().map(|event| event.file)
    }
}

/// Accumulates change events for one convergence run.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    events: BTreeMap<LogicalFile, ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the comparison for one file. Observing the same file twice
    /// keeps the latest comparison.
    pub fn observe(&mut self, rendered: &RenderedFile, previous: Option<&str>) -> &ChangeEvent {
        let event = ChangeEvent::compare(rendered, previous);
        tracing::debug!(file = %event.file, status = ?event.status, "Compared rendered file");
        self.events.insert(rendered.id, event);
        &self.events[&rendered.id]
    }

    pub fn restart_requested(&self) -> bool {
        self.events.values().any(ChangeEvent::changed)
    }

    pub fn finish(self) -> ChangeReport {
        let restart_requested = self.restart_requested();
        let (changes, unchanged): (Vec<_>, Vec<_>) =
            self.events.into_values().partition(ChangeEvent::changed);

        ChangeReport {
            changes,
            unchanged: unchanged.into_iter().map(|event| event.file).collect(),
            restart_requested,
        }
    }

    /// One-shot evaluation over `(rendered, previous)` pairs.
    pub fn evaluate<'a, I>(pairs: I) -> ChangeReport
    where
        I: IntoIterator<Item = (&'a RenderedFile, Option<&'a str>)>,
    {
        let mut notifier = Self::new();
        for (rendered, previous) in pairs {
            notifier.observe(rendered, previous);
        }
        notifier.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(id: LogicalFile, content: &str) -> RenderedFile {
        RenderedFile {
            id,
            path: PathBuf::from("/etc").join(id.file_name()),
            content: content.to_string(),
            owner: "root".into(),
            group: "root".into(),
            mode: 0o644,
        }
    }

    #[test]
    fn test_absent_previous_counts_as_created() {
        let file = rendered(LogicalFile::Main, "a\n");
        let event = ChangeEvent::compare(&file, None);

        assert_eq!(event.status, ChangeStatus::Created);
        assert!(event.changed());
        assert_eq!(event.previous_checksum, None);
        assert!(event.current_checksum.starts_with("sha256:"));
    }

    #[test]
    fn test_identical_content_is_unchanged() {
        let file = rendered(LogicalFile::Main, "a\n");
        let event = ChangeEvent::compare(&file, Some("a\n"));

        assert_eq!(event.status, ChangeStatus::Unchanged);
        assert_eq!(event.previous_checksum.as_deref(), Some(event.current_checksum.as_str()));
    }

    #[test]
    fn test_whitespace_difference_is_a_change() {
        let file = rendered(LogicalFile::Main, "a\n");
        assert_eq!(
            ChangeEvent::compare(&file, Some("a")).status,
            ChangeStatus::Modified
        );
    }

    #[test]
    fn test_many_changes_collapse_into_one_restart() {
        let main = rendered(LogicalFile::Main, "main\n");
        let rules = rendered(LogicalFile::DefaultRules, "rules\n");
        let watch = rendered(LogicalFile::ImfileWatch, "watch\n");

        let report = ChangeNotifier::evaluate([
            (&rules, None),
            (&main, Some("old\n")),
            (&watch, Some("watch\n")),
        ]);

        assert!(report.restart_requested);
        assert_eq!(
            report.changed_files().collect::<Vec<_>>(),
            vec![LogicalFile::Main, LogicalFile::DefaultRules]
        );
        assert_eq!(report.unchanged, vec![LogicalFile::ImfileWatch]);
    }

    #[test]
    fn test_duplicate_observations_are_deduplicated() {
        let main = rendered(LogicalFile::Main, "main\n");
        let report = ChangeNotifier::evaluate([(&main, None), (&main, None)]);
        assert_eq!(report.changes.len(), 1);
    }

    #[test]
    fn test_no_changes_means_no_restart() {
        let main = rendered(LogicalFile::Main, "main\n");
        let report = ChangeNotifier::evaluate([(&main, Some("main\n"))]);

        assert!(report.is_clean());
        assert!(!report.restart_requested);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let main = rendered(LogicalFile::Main, "main\n");
        let first = ChangeNotifier::evaluate([(&main, Some("x"))]);
        let second = ChangeNotifier::evaluate([(&main, Some("x"))]);
        assert_eq!(first, second);
    }
}
