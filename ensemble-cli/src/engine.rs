//! Shell task engine — the CLI's concrete task-execution collaborator.
//!
//! The orchestration core treats task execution as an external engine behind
//! [`TaskExecutionEngine`]. This implementation maps task names to shell
//! commands declared per participant in the composite manifest and runs them
//! with the participant root as working directory.
//!
//! Invocation properties are exported as environment variables, alongside
//! `ENSEMBLE_ASSUME_FLUID_DEPENDENCIES` and `ENSEMBLE_COMPOSITE_BUILD`, so an
//! out-of-process build can observe the relaxed trust model and the
//! composite flag the same way in-process logic observes [`LaunchMode`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use ensemble_core::manifest::CompositeManifest;
use ensemble_core::types::{InvocationParameters, TaskName};
use ensemble_exec::{EngineFailure, LaunchMode, TaskExecutionEngine};

/// Executes declared shell commands for each requested task, in order.
pub struct ShellTaskEngine {
    /// Participant root → (task name → shell command).
    tables: BTreeMap<PathBuf, BTreeMap<TaskName, String>>,
}

impl ShellTaskEngine {
    pub fn new(tables: BTreeMap<PathBuf, BTreeMap<TaskName, String>>) -> Self {
        Self { tables }
    }

    pub fn from_manifest(manifest: &CompositeManifest) -> Self {
        Self::new(manifest.task_tables())
    }
}

impl TaskExecutionEngine for ShellTaskEngine {
    fn execute_tasks(
        &self,
        parameters: &InvocationParameters,
        mode: LaunchMode,
    ) -> Result<(), EngineFailure> {
        let root = &parameters.project_dir;
        let table = self.tables.get(root).ok_or_else(|| {
            EngineFailure::new(format!("no tasks declared for build at {}", root.display()))
        })?;

        for task in &parameters.task_names {
            let command = table.get(task).ok_or_else(|| {
                EngineFailure::new(format!(
                    "no task named '{task}' for build at {}",
                    root.display()
                ))
            })?;

            info!("task '{}': {} (in {})", task, command, root.display());
            let mut shell = Command::new("sh");
            shell.arg("-c").arg(command).current_dir(root);
            shell.envs(&parameters.properties);
            if parameters.assume_fluid_dependencies {
                shell.env("ENSEMBLE_ASSUME_FLUID_DEPENDENCIES", "true");
            }
            if mode == LaunchMode::Composite {
                shell.env("ENSEMBLE_COMPOSITE_BUILD", "true");
            }

            let status = shell.status().map_err(|e| {
                EngineFailure::with_source(format!("failed to spawn task '{task}'"), e)
            })?;
            if !status.success() {
                return Err(EngineFailure::new(format!("task '{task}' exited with {status}")));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
