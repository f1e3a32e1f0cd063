//! In-process action execution.
//!
//! Synchronous, single-threaded dispatch within the caller's process: no
//! external transport, no queue. The executor selects the first runner
//! claiming the action's kind, passes the given scope through untouched and
//! propagates the runner's outcome — success value or failure — unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use ensemble_core::action::BuildAction;
use ensemble_core::types::BuildRequestContext;
use ensemble_scope::ServiceScope;

use crate::error::ExecError;
use crate::runner::{ActionResult, ActionRunner};

/// Result of dispatching one action.
#[derive(Debug, PartialEq)]
pub enum ExecuteOutcome {
    /// No runner claims the action's kind; nothing ran.
    NotApplicable,
    Done(ActionResult),
}

/// Drives one action through a priority-ordered runner chain.
pub struct InProcessActionExecutor {
    runners: Vec<Box<dyn ActionRunner>>,
}

impl InProcessActionExecutor {
    pub fn new(runners: Vec<Box<dyn ActionRunner>>) -> Self {
        Self { runners }
    }

    /// Execute `action` against `scope`.
    ///
    /// `extra_properties` are merged into the action's parameters before
    /// dispatch (existing keys win). Failures raised by the selected runner
    /// are not swallowed; they propagate to the caller as-is.
    pub fn execute(
        &self,
        action: &BuildAction,
        request: &BuildRequestContext,
        extra_properties: Option<&BTreeMap<String, String>>,
        scope: &Arc<ServiceScope>,
    ) -> Result<ExecuteOutcome, ExecError> {
        let action = match extra_properties {
            Some(extra) => action.with_extra_properties(extra),
            None => action.clone(),
        };

        for runner in &self.runners {
            if runner.handled_kinds().contains(&action.kind()) {
                return runner.run(&action, request, scope).map(ExecuteOutcome::Done);
            }
        }

        debug!("no runner claims action kind {:?}", action.kind());
        Ok(ExecuteOutcome::NotApplicable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_core::action::BuildActionKind;
    use ensemble_core::types::{InvocationParameters, TaskName};
    use std::sync::Mutex;

    /// Records the parameters of every action it runs.
    struct RecordingRunner {
        kinds: Vec<BuildActionKind>,
        seen: Arc<Mutex<Vec<InvocationParameters>>>,
    }

    impl ActionRunner for RecordingRunner {
        fn handled_kinds(&self) -> &[BuildActionKind] {
            &self.kinds
        }

        fn run(
            &self,
            action: &BuildAction,
            _request: &BuildRequestContext,
            _scope: &Arc<ServiceScope>,
        ) -> Result<ActionResult, ExecError> {
            self.seen.lock().unwrap().push(action.parameters().clone());
            Ok(ActionResult::None)
        }
    }

    fn execute_tasks_action() -> BuildAction {
        BuildAction::ExecuteTasks(InvocationParameters::new(
            "/work/app",
            vec![TaskName::from("build")],
        ))
    }

    #[test]
    fn unclaimed_kind_is_not_applicable() {
        let executor = InProcessActionExecutor::new(vec![Box::new(RecordingRunner {
            kinds: vec![BuildActionKind::ExecuteTasks],
            seen: Arc::new(Mutex::new(Vec::new())),
        })]);
        let scope = ServiceScope::root("build");
        let request = BuildRequestContext::new("test");

        let action = BuildAction::QueryModel {
            model: "outline".to_string(),
            parameters: InvocationParameters::new("/work/app", vec![]),
        };
        let outcome = executor
            .execute(&action, &request, None, &scope)
            .expect("dispatch");
        assert_eq!(outcome, ExecuteOutcome::NotApplicable);
    }

    #[test]
    fn first_claiming_runner_wins() {
        let first_seen = Arc::new(Mutex::new(Vec::new()));
        let second_seen = Arc::new(Mutex::new(Vec::new()));
        let executor = InProcessActionExecutor::new(vec![
            Box::new(RecordingRunner {
                kinds: vec![BuildActionKind::ExecuteTasks],
                seen: first_seen.clone(),
            }),
            Box::new(RecordingRunner {
                kinds: vec![BuildActionKind::ExecuteTasks],
                seen: second_seen.clone(),
            }),
        ]);
        let scope = ServiceScope::root("build");
        let request = BuildRequestContext::new("test");

        executor
            .execute(&execute_tasks_action(), &request, None, &scope)
            .expect("dispatch");
        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert!(second_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn extra_properties_reach_the_runner() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let executor = InProcessActionExecutor::new(vec![Box::new(RecordingRunner {
            kinds: vec![BuildActionKind::ExecuteTasks],
            seen: seen.clone(),
        })]);
        let scope = ServiceScope::root("build");
        let request = BuildRequestContext::new("test");

        let mut extra = BTreeMap::new();
        extra.insert("profile".to_string(), "release".to_string());
        executor
            .execute(&execute_tasks_action(), &request, Some(&extra), &scope)
            .expect("dispatch");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].properties.get("profile"),
            Some(&"release".to_string())
        );
    }
}
