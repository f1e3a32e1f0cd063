//! # ensemble-exec
//!
//! Composite build orchestration: cross-build context, composite-aware
//! launcher decoration, action-runner dispatch and the in-process executor.
//!
//! Call [`CompositeBuildRunner::run`] with an action, a request context, the
//! composite parameters and the shared session scope; it retargets the
//! invocation at the declared target participant and drives it synchronously
//! within the current process.

pub mod composite;
pub mod context;
pub mod error;
pub mod executor;
pub mod launcher;
pub mod runner;

pub use composite::{CompositeBuildRunner, RunOutcome};
pub use context::{CompositeContext, CompositeContextBuilder, CompositeContextCell};
pub use error::ExecError;
pub use executor::{ExecuteOutcome, InProcessActionExecutor};
pub use launcher::{
    BuildLauncher, BuildLauncherFactory, CompositeAwareLauncherFactory, EngineFailure, LaunchMode,
    LauncherFactoryService, StandardLauncherFactory, TaskExecutionEngine,
};
pub use runner::{ActionResult, ActionRunner, ExecuteTasksRunner};
