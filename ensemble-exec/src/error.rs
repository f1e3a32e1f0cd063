//! Error types for ensemble-exec.

use std::path::PathBuf;

use thiserror::Error;

use ensemble_core::types::{BuildIdentity, TaskName};
use ensemble_scope::ScopeError;

use crate::launcher::EngineFailure;

/// All errors that can arise while orchestrating a composite invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The declared target is not among the declared participant set.
    /// Raised at context-build time, before any build is launched.
    #[error("unknown participant build '{target}'; composite declares: [{}]", known_list(.known))]
    UnknownParticipant {
        target: BuildIdentity,
        known: Vec<BuildIdentity>,
    },

    /// The targeted build's own execution failed. Propagated unchanged:
    /// no local recovery, no partial-success reporting, no retry.
    #[error("task execution failed for build at {project_dir} (tasks: [{}])", task_list(.tasks))]
    TargetExecution {
        project_dir: PathBuf,
        tasks: Vec<TaskName>,
        #[source]
        source: EngineFailure,
    },

    /// A capability lookup failed in the scope chain.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

fn known_list(known: &[BuildIdentity]) -> String {
    known
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn task_list(tasks: &[TaskName]) -> String {
    tasks
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
