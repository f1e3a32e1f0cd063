//! End-to-end composite orchestration scenarios against fake collaborators.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ensemble_core::action::BuildAction;
use ensemble_core::types::{
    BuildIdentity, BuildRequestContext, CompositeParameters, InvocationParameters,
    ParticipantBuild, TaskName,
};
use ensemble_exec::{
    BuildLauncher, BuildLauncherFactory, CompositeBuildRunner, EngineFailure, ExecError,
    LaunchMode, LauncherFactoryService, RunOutcome, StandardLauncherFactory, TaskExecutionEngine,
};
use ensemble_scope::ServiceScope;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Records every launch the orchestration hands to the task engine.
#[derive(Default)]
struct RecordingEngine {
    launches: Mutex<Vec<(InvocationParameters, LaunchMode)>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingEngine {
    fn failing(message: &str) -> Self {
        Self {
            launches: Mutex::new(Vec::new()),
            fail_with: Mutex::new(Some(message.to_string())),
        }
    }

    fn launches(&self) -> Vec<(InvocationParameters, LaunchMode)> {
        self.launches.lock().unwrap().clone()
    }
}

impl TaskExecutionEngine for RecordingEngine {
    fn execute_tasks(
        &self,
        parameters: &InvocationParameters,
        mode: LaunchMode,
    ) -> Result<(), EngineFailure> {
        self.launches
            .lock()
            .unwrap()
            .push((parameters.clone(), mode));
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(EngineFailure::new(message.clone())),
            None => Ok(()),
        }
    }
}

/// Counts factory invocations across all construction variants.
struct CountingFactory {
    delegate: StandardLauncherFactory,
    created: AtomicUsize,
}

impl CountingFactory {
    fn new(engine: Arc<dyn TaskExecutionEngine>) -> Self {
        Self {
            delegate: StandardLauncherFactory::new(engine),
            created: AtomicUsize::new(0),
        }
    }
}

impl BuildLauncherFactory for CountingFactory {
    fn create(&self, parameters: InvocationParameters) -> BuildLauncher {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.delegate.create(parameters)
    }

    fn create_in_scope(
        &self,
        parameters: InvocationParameters,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.delegate.create_in_scope(parameters, parent)
    }

    fn create_for_request(
        &self,
        parameters: InvocationParameters,
        request: &BuildRequestContext,
        parent: &Arc<ServiceScope>,
    ) -> BuildLauncher {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.delegate.create_for_request(parameters, request, parent)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    engine: Arc<RecordingEngine>,
    factory: Arc<CountingFactory>,
    session: Arc<ServiceScope>,
}

fn harness(engine: RecordingEngine) -> Harness {
    let engine = Arc::new(engine);
    let factory = Arc::new(CountingFactory::new(engine.clone()));
    let session = ServiceScope::root("session");
    session.register(LauncherFactoryService(factory.clone()));
    Harness {
        engine,
        factory,
        session,
    }
}

fn two_participants() -> CompositeParameters {
    CompositeParameters {
        target_build: BuildIdentity::from("b"),
        builds: vec![
            ParticipantBuild::new("a", "/a"),
            ParticipantBuild::new("b", "/b"),
        ],
    }
}

fn execute_build_task() -> BuildAction {
    // The original request points at participant A's root; retargeting must
    // override it.
    BuildAction::ExecuteTasks(InvocationParameters::new(
        "/a",
        vec![TaskName::from("build")],
    ))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn tasks_run_once_against_the_target_with_retargeted_parameters() {
    let h = harness(RecordingEngine::default());
    let request = BuildRequestContext::new("test");

    let outcome = CompositeBuildRunner::new()
        .run(&execute_build_task(), &request, &two_participants(), &h.session)
        .expect("composite run");
    assert_eq!(outcome, RunOutcome::Completed);

    let launches = h.engine.launches();
    assert_eq!(launches.len(), 1, "exactly one launch against the target");

    let (parameters, mode) = &launches[0];
    assert_eq!(parameters.project_dir, PathBuf::from("/b"));
    assert_eq!(parameters.task_names, vec![TaskName::from("build")]);
    assert!(!parameters.search_upwards);
    assert!(parameters.assume_fluid_dependencies);
    assert_eq!(*mode, LaunchMode::Composite, "downstream must observe the composite");
}

#[test]
fn unknown_target_aborts_before_any_launcher_is_constructed() {
    let h = harness(RecordingEngine::default());
    let request = BuildRequestContext::new("test");
    let mut parameters = two_participants();
    parameters.target_build = BuildIdentity::from("c");

    let err = CompositeBuildRunner::new()
        .run(&execute_build_task(), &request, &parameters, &h.session)
        .unwrap_err();

    assert!(matches!(err, ExecError::UnknownParticipant { .. }), "got: {err}");
    assert!(err.to_string().contains("'c'"));
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 0);
    assert!(h.engine.launches().is_empty());
}

#[test]
fn target_failure_propagates_with_original_cause() {
    let h = harness(RecordingEngine::failing("task 'build' exited with status 1"));
    let request = BuildRequestContext::new("test");

    let err = CompositeBuildRunner::new()
        .run(&execute_build_task(), &request, &two_participants(), &h.session)
        .unwrap_err();

    match err {
        ExecError::TargetExecution {
            project_dir,
            tasks,
            source,
        } => {
            assert_eq!(project_dir, PathBuf::from("/b"));
            assert_eq!(tasks, vec![TaskName::from("build")]);
            assert_eq!(source.to_string(), "task 'build' exited with status 1");
        }
        other => panic!("expected TargetExecution, got: {other}"),
    }
}

#[test]
fn model_query_is_skipped_without_touching_collaborators() {
    let h = harness(RecordingEngine::default());
    let request = BuildRequestContext::new("test");

    let action = BuildAction::QueryModel {
        model: "project-outline".to_string(),
        parameters: InvocationParameters::new("/a", vec![]),
    };
    let outcome = CompositeBuildRunner::new()
        .run(&action, &request, &two_participants(), &h.session)
        .expect("skip");

    assert_eq!(outcome, RunOutcome::Skipped);
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 0);
    assert!(h.engine.launches().is_empty());
}

#[test]
fn session_scope_is_untouched_across_invocations() {
    let h = harness(RecordingEngine::default());
    let request = BuildRequestContext::new("test");

    CompositeBuildRunner::new()
        .run(&execute_build_task(), &request, &two_participants(), &h.session)
        .expect("first run");
    CompositeBuildRunner::new()
        .run(&execute_build_task(), &request, &two_participants(), &h.session)
        .expect("second run");

    // Two independent invocations, each with its own scope chain; the shared
    // session factory serves both without any composite registrations
    // leaking into it.
    assert_eq!(h.engine.launches().len(), 2);
    assert!(h.session.get::<ensemble_exec::CompositeContextCell>().is_err());
    let shared = h.session.get::<LauncherFactoryService>().expect("factory");
    assert_eq!(shared.0.create(execute_build_task().parameters().clone()).mode(), LaunchMode::Standalone);
}
