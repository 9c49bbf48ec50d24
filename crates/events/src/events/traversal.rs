use selutils_types::{ObjectKind, TraversalMode, TraversalPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of the policy a run was started with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySummary {
    pub recursive: bool,
    pub dereference: bool,
    pub mode: TraversalMode,
    pub root_guard: bool,
}

impl From<&TraversalPolicy> for PolicySummary {
    fn from(policy: &TraversalPolicy) -> Self {
        Self {
            recursive: policy.recursive(),
            dereference: policy.dereference(),
            mode: policy.mode(),
            root_guard: policy.root_guard_enabled(),
        }
    }
}

/// Events emitted while the engine walks the named roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraversalEvent {
    RunStarted {
        run_id: String,
        roots: usize,
        policy: PolicySummary,
    },

    /// A label was applied.
    ObjectApplied {
        run_id: String,
        path: PathBuf,
        kind: ObjectKind,
    },

    /// An object produced a failed outcome.
    ObjectFailed {
        run_id: String,
        path: PathBuf,
        code: Option<String>,
        message: String,
    },

    SymlinkResolved {
        run_id: String,
        link: PathBuf,
        target: PathBuf,
        target_kind: ObjectKind,
    },

    DirectoryEntered {
        run_id: String,
        path: PathBuf,
        entries: usize,
    },

    RunCompleted {
        run_id: String,
        visited: usize,
        failed: usize,
        duration_ms: u64,
    },
}

impl TraversalEvent {
    #[must_use]
    pub fn run_id(&self) -> &str {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::ObjectApplied { run_id, .. }
            | Self::ObjectFailed { run_id, .. }
            | Self::SymlinkResolved { run_id, .. }
            | Self::DirectoryEntered { run_id, .. }
            | Self::RunCompleted { run_id, .. } => run_id,
        }
    }
}
