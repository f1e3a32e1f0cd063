//! Build actions — tagged requests describing the kind of work wanted.
//!
//! An action is constructed once by the caller and consumed read-only by the
//! runner chain. Dispatch happens on the explicit [`BuildActionKind`]
//! discriminant; runners declare which kinds they claim instead of inspecting
//! payload types.

use std::collections::BTreeMap;

use crate::types::InvocationParameters;

/// Discriminant for [`BuildAction`] dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildActionKind {
    /// Execute named tasks against a build.
    ExecuteTasks,
    /// Query a build model (execution is out of scope for this engine;
    /// the kind exists so dispatch can decline it).
    QueryModel,
}

/// A tagged unit of requested work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildAction {
    ExecuteTasks(InvocationParameters),
    QueryModel {
        model: String,
        parameters: InvocationParameters,
    },
}

impl BuildAction {
    pub fn kind(&self) -> BuildActionKind {
        match self {
            BuildAction::ExecuteTasks(_) => BuildActionKind::ExecuteTasks,
            BuildAction::QueryModel { .. } => BuildActionKind::QueryModel,
        }
    }

    /// The invocation parameters the action carries, whatever its kind.
    pub fn parameters(&self) -> &InvocationParameters {
        match self {
            BuildAction::ExecuteTasks(parameters) => parameters,
            BuildAction::QueryModel { parameters, .. } => parameters,
        }
    }

    /// A copy of this action with extra properties merged into its
    /// parameters; existing keys win.
    pub fn with_extra_properties(&self, extra: &BTreeMap<String, String>) -> BuildAction {
        let merged = self.parameters().with_extra_properties(extra);
        match self {
            BuildAction::ExecuteTasks(_) => BuildAction::ExecuteTasks(merged),
            BuildAction::QueryModel { model, .. } => BuildAction::QueryModel {
                model: model.clone(),
                parameters: merged,
            },
        }
    }
}
