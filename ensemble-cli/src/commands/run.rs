//! `ensemble run` — execute tasks against the composite's target participant.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use ensemble_core::action::BuildAction;
use ensemble_core::manifest::{self, CompositeManifest};
use ensemble_core::types::{
    BuildIdentity, BuildRequestContext, CompositeParameters, InvocationParameters, TaskName,
};
use ensemble_exec::{
    CompositeBuildRunner, LauncherFactoryService, RunOutcome, StandardLauncherFactory,
};
use ensemble_scope::ServiceScope;

use crate::engine::ShellTaskEngine;

/// Arguments for `ensemble run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task names to execute, in order.
    #[arg(required = true)]
    pub tasks: Vec<String>,

    /// Path to the composite manifest.
    #[arg(long, default_value = "ensemble.yaml")]
    pub manifest: PathBuf,

    /// Target participant id (overrides the manifest's `target`).
    #[arg(long)]
    pub target: Option<String>,

    /// Emit a machine-readable JSON summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    target: String,
    tasks: Vec<String>,
    participants: usize,
    outcome: String,
    started_at: DateTime<Utc>,
    duration_ms: i64,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let manifest = manifest::load_manifest(&self.manifest).with_context(|| {
            format!("failed to load composite manifest {}", self.manifest.display())
        })?;
        let composite = manifest
            .composite_parameters(self.target.clone().map(BuildIdentity::from))
            .context("cannot determine the target build")?;

        let request = BuildRequestContext::new("ensemble-cli");
        let outcome = execute(&manifest, &composite, &request, &self.tasks, &self.manifest)
            .with_context(|| format!("composite run failed for target '{}'", composite.target_build))?;

        let duration_ms = (Utc::now() - request.started_at).num_milliseconds();
        if self.json {
            let summary = RunSummary {
                target: composite.target_build.to_string(),
                tasks: self.tasks.clone(),
                participants: composite.builds.len(),
                outcome: outcome_key(outcome).to_string(),
                started_at: request.started_at,
                duration_ms,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
            return Ok(());
        }

        match outcome {
            RunOutcome::Completed => println!(
                "{} '{}' — {} task(s) completed ({duration_ms} ms)",
                "✓".green(),
                composite.target_build,
                self.tasks.len(),
            ),
            RunOutcome::Skipped => println!(
                "{} '{}' — action not applicable to the composite runner",
                "·".yellow(),
                composite.target_build,
            ),
        }
        Ok(())
    }
}

/// Wire the scope chain, register the shared launcher factory and drive the
/// composite orchestration runner.
fn execute(
    manifest: &CompositeManifest,
    composite: &CompositeParameters,
    request: &BuildRequestContext,
    tasks: &[String],
    manifest_path: &Path,
) -> Result<RunOutcome, ensemble_exec::ExecError> {
    let process = ServiceScope::root("process");
    let session = process.child("session");

    let engine = Arc::new(ShellTaskEngine::from_manifest(manifest));
    session.register(LauncherFactoryService(Arc::new(
        StandardLauncherFactory::new(engine),
    )));

    // The original invocation is rooted at the manifest's directory; the
    // orchestration retargets it at the chosen participant.
    let original_root = match manifest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let parameters = InvocationParameters::new(
        original_root,
        tasks.iter().map(|t| TaskName::from(t.as_str())).collect(),
    );
    let action = BuildAction::ExecuteTasks(parameters);

    CompositeBuildRunner::new().run(&action, request, composite, &session)
}

fn outcome_key(outcome: RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Completed => "completed",
        RunOutcome::Skipped => "skipped",
    }
}
