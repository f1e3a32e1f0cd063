//! Build launchers and launcher factories.
//!
//! A [`BuildLauncher`] binds invocation parameters to the task-execution
//! engine of the targeted build. Its [`LaunchMode`] is part of its immutable
//! configuration: the composite-aware factory decorator re-tags every
//! launcher it produces at construction time, so downstream build logic
//! learns "this run is part of a composite" without any post-construction
//! flag flipping.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use ensemble_core::types::{BuildRequestContext, InvocationParameters};
use ensemble_scope::ServiceScope;

use crate::error::ExecError;

// ---------------------------------------------------------------------------
// Task-execution collaborator boundary
// ---------------------------------------------------------------------------

/// Failure reported by a task-execution engine.
///
/// Opaque at this boundary: the engine supplies the message and, where one
/// exists, the underlying cause. The chain is preserved end-to-end so the
/// outer caller can report which participant build failed and why.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineFailure {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The targeted build's own task-execution engine.
///
/// External collaborator: this crate never computes task graphs or
/// up-to-date state, it only hands the engine retargeted parameters and the
/// launch mode and propagates the outcome unchanged.
pub trait TaskExecutionEngine: Send + Sync {
    fn execute_tasks(
        &self,
        parameters: &InvocationParameters,
        mode: LaunchMode,
    ) -> Result<(), EngineFailure>;
}

// ---------------------------------------------------------------------------
// BuildLauncher
// ---------------------------------------------------------------------------

/// How a launched build relates to the invocation that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Standalone,
    /// The launch is one participant of a composite invocation.
    Composite,
}

/// One configured, runnable build launch.
pub struct BuildLauncher {
    parameters: InvocationParameters,
    mode: LaunchMode,
    engine: Arc<dyn TaskExecutionEngine>,
    request: Option<BuildRequestContext>,
    parent_scope: Option<String>,
}

impl BuildLauncher {
    pub fn parameters(&self) -> &InvocationParameters {
        &self.parameters
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Re-tag the launch mode; consumes the launcher and returns the
    /// re-configured one.
    pub fn with_mode(mut self, mode: LaunchMode) -> BuildLauncher {
        self.mode = mode;
        self
    }

    /// Run the configured build synchronously in the current process.
    ///
    /// Engine failures surface as [`ExecError::TargetExecution`] with the
    /// underlying cause attached.
    pub fn run(&self) -> Result<(), ExecError> {
        debug!(
            "launching build at {} (mode: {:?}, client: {}, scope: {})",
            self.parameters.project_dir.display(),
            self.mode,
            self.request.as_ref().map(|r| r.client.as_str()).unwrap_or("-"),
            self.parent_scope.as_deref().unwrap_or("-"),
        );
        self.engine
            .execute_tasks(&self.parameters, self.mode)
            .map_err(|source| ExecError::TargetExecution {
                project_dir: self.parameters.project_dir.clone(),
                tasks: self.parameters.task_names.clone(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Produces [`BuildLauncher`]s.
///
/// Three construction variants: bare parameters, parameters within a parent
/// scope, and parameters for an explicit request within a parent scope.
pub trait BuildLauncherFactory: Send + Sync {
    fn create(&self, parameters: InvocationParameters) -> BuildLauncher;

    fn create_in_scope(
        &self,
        parameters: InvocationParameters,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher;

    fn create_for_request(
        &self,
        parameters: InvocationParameters,
        request: &BuildRequestContext,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher;
}

/// The shared factory: launchers run through the given engine, tagged
/// [`LaunchMode::Standalone`].
pub struct StandardLauncherFactory {
    engine: Arc<dyn TaskExecutionEngine>,
}

impl StandardLauncherFactory {
    pub fn new(engine: Arc<dyn TaskExecutionEngine>) -> Self {
        Self { engine }
    }
}

impl BuildLauncherFactory for StandardLauncherFactory {
    fn create(&self, parameters: InvocationParameters) -> BuildLauncher {
        BuildLauncher {
            parameters,
            mode: LaunchMode::Standalone,
            engine: self.engine.clone(),
            request: None,
            parent_scope: None,
        }
    }

    fn create_in_scope(
        &self,
        parameters: InvocationParameters,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        BuildLauncher {
            parameters,
            mode: LaunchMode::Standalone,
            engine: self.engine.clone(),
            request: None,
            parent_scope: Some(parent.label().to_string()),
        }
    }

    fn create_for_request(
        &self,
        parameters: InvocationParameters,
        request: &BuildRequestContext,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        BuildLauncher {
            parameters,
            mode: LaunchMode::Standalone,
            engine: self.engine.clone(),
            request: Some(request.clone()),
            parent_scope: Some(parent.label().to_string()),
        }
    }
}

/// Decorator marking every produced launcher as part of a composite.
///
/// All three construction variants delegate and re-tag; none may skip the
/// tag — it is the single signal by which deep build logic observes the
/// composite.
pub struct CompositeAwareLauncherFactory {
    delegate: Arc<dyn BuildLauncherFactory>,
}

impl CompositeAwareLauncherFactory {
    pub fn new(delegate: Arc<dyn BuildLauncherFactory>) -> Self {
        Self { delegate }
    }
}

impl BuildLauncherFactory for CompositeAwareLauncherFactory {
    fn create(&self, parameters: InvocationParameters) -> BuildLauncher {
        self.delegate.create(parameters).with_mode(LaunchMode::Composite)
    }

    fn create_in_scope(
        &self,
        parameters: InvocationParameters,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        self.delegate
            .create_in_scope(parameters, parent)
            .with_mode(LaunchMode::Composite)
    }

    fn create_for_request(
        &self,
        parameters: InvocationParameters,
        request: &BuildRequestContext,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        self.delegate
            .create_for_request(parameters, request, parent)
            .with_mode(LaunchMode::Composite)
    }
}

/// Scope capability wrapper for the launcher factory.
///
/// Capabilities resolve by concrete type; the wrapper lets a trait-object
/// factory live in a scope and lets a build-tier registration shadow the
/// session's.
pub struct LauncherFactoryService(pub Arc<dyn BuildLauncherFactory>);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
