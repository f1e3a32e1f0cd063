//! Domain types for composite invocations.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. Descriptor types are immutable once handed to the orchestration
//! layer — retargeting produces fresh values instead of mutating shared ones.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed logical identity for a participant build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildIdentity(pub String);

impl fmt::Display for BuildIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BuildIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BuildIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name of a requested task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskName(pub String);

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// One project root taking part in a composite invocation.
///
/// Created once at composite-setup time and never mutated afterwards; the
/// descriptor lives for the duration of the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBuild {
    pub identity: BuildIdentity,
    /// Absolute path to the participant's project root.
    pub root_dir: PathBuf,
}

impl ParticipantBuild {
    pub fn new(identity: impl Into<BuildIdentity>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            root_dir: root_dir.into(),
        }
    }
}

/// The composite half of an incoming request: the declared participant set
/// and the identity of the build whose tasks will actually execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeParameters {
    pub target_build: BuildIdentity,
    /// Ordered participant descriptors; order is significant for derived data.
    pub builds: Vec<ParticipantBuild>,
}

// ---------------------------------------------------------------------------
// Invocation parameters
// ---------------------------------------------------------------------------

/// The configuration a single build launch runs with.
///
/// Cloned fresh per invocation from the originally requested parameters;
/// never shared across participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationParameters {
    /// Project root the launched build operates on.
    pub project_dir: PathBuf,
    pub task_names: Vec<TaskName>,
    /// Whether the launched build may search upward for an enclosing project.
    pub search_upwards: bool,
    /// Instructs the dependency-resolution collaborator to treat sibling
    /// outputs as always-rebuildable instead of trusting published artifacts.
    pub assume_fluid_dependencies: bool,
    /// Free-form properties handed through to the launched build.
    pub properties: BTreeMap<String, String>,
}

impl InvocationParameters {
    pub fn new(project_dir: impl Into<PathBuf>, task_names: Vec<TaskName>) -> Self {
        Self {
            project_dir: project_dir.into(),
            task_names,
            search_upwards: true,
            assume_fluid_dependencies: false,
            properties: BTreeMap::new(),
        }
    }

    /// Redirect these parameters at a composite participant.
    ///
    /// The clone keeps the requested tasks and properties but forces the
    /// project root to the participant's root, disables upward project
    /// search (composite participants are explicit, not inferred) and sets
    /// the fluid-dependency flag.
    pub fn for_participant(&self, participant: &ParticipantBuild) -> InvocationParameters {
        let mut retargeted = self.clone();
        retargeted.project_dir = participant.root_dir.clone();
        retargeted.search_upwards = false;
        retargeted.assume_fluid_dependencies = true;
        retargeted
    }

    /// Merge extra properties into a fresh copy; existing keys are kept.
    pub fn with_extra_properties(&self, extra: &BTreeMap<String, String>) -> InvocationParameters {
        let mut merged = self.clone();
        for (key, value) in extra {
            merged
                .properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Request context
// ---------------------------------------------------------------------------

/// Immutable metadata about the request driving an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequestContext {
    /// Identifies the requesting client (CLI, tooling integration, test).
    pub client: String,
    pub started_at: DateTime<Utc>,
}

impl BuildRequestContext {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            started_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
