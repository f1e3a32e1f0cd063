//! Action runners — polymorphic handlers for build actions.
//!
//! Each runner declares the action kinds it claims; the executor tries
//! runners in priority order and stops at the first claimant. Runners never
//! inspect payload types, only the explicit kind discriminant.

use std::sync::Arc;

use tracing::debug;

use ensemble_core::action::{BuildAction, BuildActionKind};
use ensemble_core::types::BuildRequestContext;
use ensemble_scope::ServiceScope;

use crate::error::ExecError;
use crate::launcher::LauncherFactoryService;

/// Outcome of one executed action: a value payload, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// The action is side-effect-oriented and reports no value.
    None,
    /// A model payload, for query-kind actions.
    Model(serde_json::Value),
}

/// A handler for one or more action kinds.
pub trait ActionRunner: Send + Sync {
    /// The kinds this runner claims, in the order it prefers them.
    fn handled_kinds(&self) -> &[BuildActionKind];

    /// Execute a claimed action against the given scope.
    fn run(
        &self,
        action: &BuildAction,
        request: &BuildRequestContext,
        scope: &Arc<ServiceScope>,
    ) -> Result<ActionResult, ExecError>;
}

/// Runs "execute named tasks" actions against the targeted build.
///
/// Resolves the launcher factory from the given scope — so a build-tier
/// registration (e.g. the composite-aware decoration) shadows the shared
/// session factory — creates a launcher for the request, and runs it.
/// Deliberately reports [`ActionResult::None`]: task execution is observed
/// through side effects on the target project, not a returned value.
pub struct ExecuteTasksRunner;

impl ActionRunner for ExecuteTasksRunner {
    fn handled_kinds(&self) -> &[BuildActionKind] {
        &[BuildActionKind::ExecuteTasks]
    }

    fn run(
        &self,
        action: &BuildAction,
        request: &BuildRequestContext,
        scope: &Arc<ServiceScope>,
    ) -> Result<ActionResult, ExecError> {
        let factory = scope.get::<LauncherFactoryService>()?;
        debug!(
            "running tasks for build at {}",
            action.parameters().project_dir.display()
        );
        let launcher = factory
            .0
            .create_for_request(action.parameters().clone(), request, scope);
        launcher.run()?;
        Ok(ActionResult::None)
    }
}
