//! Convergence run
//!
//! A run drives one attribute tree through resolve, validate, render and
//! diff. Each stage is a state; a run only moves forward, and a rejected run
//! never reaches rendering. Writes happen only through [`Convergence::apply`]
//! and the restart signal is returned after every write has succeeded.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeResolver, AttributeTree, ResolvedConfig};
use crate::collab::{ContentSource, FileSink};
use crate::diff::{DiffStat, diff_stat, unified_diff};
use crate::error::{Error, Result};
use crate::notify::{ChangeNotifier, ChangeReport};
use crate::packages::{PackageRequirement, PackageSelector};
use crate::platform::Platform;
use crate::render::{ConfigRenderer, LogicalFile, ManagedDirectory, RenderedFile};
use crate::validation::ConstraintValidator;

/// Stage of a convergence run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Idle,
    Resolving,
    Validating,
    /// Validation failed; nothing was rendered
    Rejected,
    Rendering,
    Diffing,
    /// Every rendered file matches what is persisted
    Clean,
    /// At least one file must be written
    ChangesPending,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Rejected | RunState::Clean | RunState::ChangesPending
        )
    }

    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Resolving, Validating)
                | (Validating, Rejected)
                | (Validating, Rendering)
                | (Rendering, Diffing)
                | (Diffing, Clean)
                | (Diffing, ChangesPending)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Resolving => "resolving",
            RunState::Validating => "validating",
            RunState::Rejected => "rejected",
            RunState::Rendering => "rendering",
            RunState::Diffing => "diffing",
            RunState::Clean => "clean",
            RunState::ChangesPending => "changes-pending",
        };
        f.write_str(name)
    }
}

/// Everything a validated run intends to put on the host.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub config: ResolvedConfig,
    pub packages: Vec<PackageRequirement>,
    pub directories: Vec<ManagedDirectory>,
    pub files: Vec<RenderedFile>,
}

impl Plan {
    pub fn file(&self, id: LogicalFile) -> Option<&RenderedFile> {
        self.files.iter().find(|file| file.id == id)
    }
}

/// Preview of one changed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub file: LogicalFile,
    pub path: PathBuf,
    pub stat: DiffStat,
    pub diff: String,
}

/// A finished run: the plan, what changed, and the terminal state.
#[derive(Debug, Clone)]
pub struct Convergence {
    pub plan: Plan,
    pub report: ChangeReport,
    pub state: RunState,
    previous: BTreeMap<LogicalFile, Option<String>>,
}

/// What [`Convergence::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub directories: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
    pub restart_requested: bool,
}

impl Convergence {
    pub fn restart_requested(&self) -> bool {
        self.report.restart_requested
    }

    pub fn is_clean(&self) -> bool {
        self.state == RunState::Clean
    }

    /// Unified diffs for every changed file, in load order.
    pub fn diffs(&self) -> Vec<FileDiff> {
        self.report
            .changes
            .iter()
            .filter_map(|event| {
                let file = self.plan.file(event.file)?;
                let previous = self.previous.get(&event.file).and_then(Option::as_deref);
                Some(FileDiff {
                    file: file.id,
                    path: file.path.clone(),
                    stat: diff_stat(previous, &file.content),
                    diff: unified_diff(&file.path, previous, &file.content),
                })
            })
            .collect()
    }

    /// Hand directories, then changed files, to `sink`.
    ///
    /// The restart signal is only reported once every write succeeded; a
    /// failed write aborts with an error and no restart.
    pub fn apply(&self, sink: &dyn FileSink) -> Result<ApplyOutcome> {
        let mut outcome = ApplyOutcome::default();

        for directory in &self.plan.directories {
            sink.ensure_directory(directory)?;
            outcome.directories.push(directory.path.clone());
        }

        for id in self.report.changed_files() {
            if let Some(file) = self.plan.file(id) {
                sink.write_file(file)?;
                outcome.written.push(file.path.clone());
            }
        }

        outcome.restart_requested = self.report.restart_requested;
        tracing::info!(
            written = outcome.written.len(),
            restart_requested = outcome.restart_requested,
            "Applied convergence"
        );
        Ok(outcome)
    }
}

/// Drives one attribute tree through the engine.
#[derive(Debug)]
pub struct ConvergenceRun {
    resolver: AttributeResolver,
    validator: ConstraintValidator,
    selector: PackageSelector,
    renderer: ConfigRenderer,
    state: RunState,
    history: Vec<RunState>,
}

impl ConvergenceRun {
    pub fn new(platform: Platform) -> Self {
        Self::with_resolver(AttributeResolver::new(platform))
    }

    /// Run with a custom resolver, e.g. one carrying a different default table.
    pub fn with_resolver(resolver: AttributeResolver) -> Self {
        Self {
            resolver,
            validator: ConstraintValidator::new(),
            selector: PackageSelector::new(),
            renderer: ConfigRenderer::new(),
            state: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state the run has been in, oldest first.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    fn transition(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "Run transition");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Resolve, validate and render. Leaves the run in `Rendering`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] and moves to `Rejected` when a
    /// constraint does not hold.
    pub fn plan(&mut self, tree: &AttributeTree) -> Result<Plan> {
        self.transition(RunState::Resolving)?;
        let config = self.resolver.resolve(tree);

        self.transition(RunState::Validating)?;
        if let Err(violation) = self.validator.validate(&config) {
            self.transition(RunState::Rejected)?;
            tracing::warn!(attribute = %violation.attribute, "Run rejected: {}", violation.message);
            return Err(violation.into());
        }

        self.transition(RunState::Rendering)?;
        Ok(Plan {
            packages: self.selector.select(&config),
            directories: self.renderer.directories(&config),
            files: self.renderer.render(&config),
            config,
        })
    }

    /// Compare a plan against persisted content and finish the run.
    pub fn diff(&mut self, plan: Plan, source: &dyn ContentSource) -> Result<Convergence> {
        self.transition(RunState::Diffing)?;

        let mut notifier = ChangeNotifier::new();
        let mut previous = BTreeMap::new();
        for file in &plan.files {
            let persisted = source.previous_content(&file.path)?;
            notifier.observe(file, persisted.as_deref());
            previous.insert(file.id, persisted);
        }
        let report = notifier.finish();

        let terminal = if report.restart_requested {
            RunState::ChangesPending
        } else {
            RunState::Clean
        };
        self.transition(terminal)?;

        tracing::info!(
            state = %terminal,
            changed = report.changes.len(),
            "Convergence run finished"
        );

        Ok(Convergence {
            plan,
            report,
            state: terminal,
            previous,
        })
    }

    /// [`plan`](Self::plan) followed by [`diff`](Self::diff).
    pub fn converge(
        &mut self,
        tree: &AttributeTree,
        source: &dyn ContentSource,
    ) -> Result<Convergence> {
        let plan = self.plan(tree)?;
        self.diff(plan, source)
    }
}
