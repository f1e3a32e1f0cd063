//! Composite orchestration runner.
//!
//! Top-level coordinator for one composite invocation. Given an action, a
//! request context and the composite parameters, it decides whether the
//! action applies, layers a composite-aware scope over the shared session
//! scope, retargets the invocation at the declared target participant and
//! drives it through the in-process executor.
//!
//! The sequence per invocation:
//! 1. Evaluate the action kind; anything but "execute tasks" is skipped so
//!    other runners in a larger chain can claim it.
//! 2. Prepare a composite-aware child scope: a fresh, empty context cell and
//!    a context builder seeded with the full participant list.
//! 3. Retarget: resolve the target (unknown targets abort here, before any
//!    launcher exists), clone the original parameters against its root.
//! 4. Execute through a fresh per-build scope whose launcher factory is the
//!    composite-aware decoration of the session's.
//!
//! Runner instances are not reused across invocations.

use std::sync::Arc;

use tracing::info;

use ensemble_core::action::{BuildAction, BuildActionKind};
use ensemble_core::types::{BuildRequestContext, CompositeParameters};
use ensemble_scope::ServiceScope;

use crate::context::{CompositeContextBuilder, CompositeContextCell};
use crate::error::ExecError;
use crate::executor::InProcessActionExecutor;
use crate::launcher::{CompositeAwareLauncherFactory, LauncherFactoryService};
use crate::runner::ExecuteTasksRunner;

/// Terminal outcome of one composite invocation.
///
/// `Completed` deliberately carries no value: composite task execution is
/// fire-and-forget, observed via side effects on the target project. Do not
/// "fix" this into returning the executed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The action is not this runner's concern; nothing was built.
    Skipped,
    Completed,
}

/// Orchestrates one build action across a composite invocation.
#[derive(Debug, Default)]
pub struct CompositeBuildRunner;

impl CompositeBuildRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `action` against the composite's target participant.
    ///
    /// Returns [`RunOutcome::Skipped`] for action kinds this runner does not
    /// claim. A failure anywhere in the sequence aborts the whole invocation;
    /// scope teardown still runs on every exit path.
    pub fn run(
        &self,
        action: &BuildAction,
        request: &BuildRequestContext,
        parameters: &CompositeParameters,
        session: &Arc<ServiceScope>,
    ) -> Result<RunOutcome, ExecError> {
        if action.kind() != BuildActionKind::ExecuteTasks {
            return Ok(RunOutcome::Skipped);
        }

        let composite = composite_aware_scope(parameters, session);
        let builder = composite.get::<CompositeContextBuilder>()?;
        let target = builder.participant(&parameters.target_build)?.clone();

        let retargeted = action.parameters().for_participant(&target);
        info!(
            "executing tasks [{}] for participant '{}' at {}",
            retargeted
                .task_names
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            target.identity,
            target.root_dir.display(),
        );

        let shared = session.get::<LauncherFactoryService>()?;
        let build_scope = composite.child("build");
        build_scope.register(LauncherFactoryService(Arc::new(
            CompositeAwareLauncherFactory::new(shared.0.clone()),
        )));

        let executor = InProcessActionExecutor::new(vec![Box::new(ExecuteTasksRunner)]);
        executor.execute(
            &BuildAction::ExecuteTasks(retargeted),
            request,
            None,
            &build_scope,
        )?;

        // The executed payload is intentionally dropped on success.
        Ok(RunOutcome::Completed)
    }
}

/// Layer the composite-aware scope over the shared session scope: a fresh,
/// empty-until-populated context cell plus a builder seeded with the full
/// participant list. The dependency-resolution collaborator reads both.
fn composite_aware_scope(
    parameters: &CompositeParameters,
    session: &Arc<ServiceScope>,
) -> Arc<ServiceScope> {
    let composite = session.child("composite");
    composite.register(CompositeContextCell::new());
    composite.register(CompositeContextBuilder::new(parameters.builds.clone()));
    composite
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
