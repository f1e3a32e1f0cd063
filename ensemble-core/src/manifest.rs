//! Composite manifest — `ensemble.yaml`.
//!
//! # Layout
//!
//! ```yaml
//! target: app
//! builds:
//!   - id: app
//!     dir: ./app
//!     tasks:
//!       build: "cargo build"
//!   - id: lib
//!     dir: ../shared-lib
//!     tasks:
//!       build: "cargo build"
//! ```
//!
//! `dir` entries may be relative; they resolve against the directory the
//! manifest was loaded from. Participant order in the file is preserved —
//! derived composite data depends on it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::types::{BuildIdentity, CompositeParameters, ParticipantBuild, TaskName};

/// One participant entry as declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestParticipant {
    pub id: BuildIdentity,
    pub dir: PathBuf,
    /// Task name → shell command, for engines that execute tasks as commands.
    #[serde(default)]
    pub tasks: BTreeMap<TaskName, String>,
}

/// Parsed `ensemble.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeManifest {
    /// Default target build; a caller-supplied target overrides this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BuildIdentity>,
    pub builds: Vec<ManifestParticipant>,
}

impl CompositeManifest {
    /// Assemble [`CompositeParameters`] for this manifest.
    ///
    /// `target_override` wins over the manifest's `target`; with neither,
    /// fails with [`CoreError::MissingTarget`]. Membership of the target in
    /// the participant set is NOT checked here — that is the composite
    /// context builder's contract.
    pub fn composite_parameters(
        &self,
        target_override: Option<BuildIdentity>,
    ) -> Result<CompositeParameters, CoreError> {
        let target_build = target_override
            .or_else(|| self.target.clone())
            .ok_or(CoreError::MissingTarget)?;
        Ok(CompositeParameters {
            target_build,
            builds: self
                .builds
                .iter()
                .map(|p| ParticipantBuild::new(p.id.clone(), p.dir.clone()))
                .collect(),
        })
    }

    /// Per-root task command tables, keyed by participant root.
    pub fn task_tables(&self) -> BTreeMap<PathBuf, BTreeMap<TaskName, String>> {
        self.builds
            .iter()
            .map(|p| (p.dir.clone(), p.tasks.clone()))
            .collect()
    }
}

/// Load and validate the composite manifest at `path`.
///
/// Relative participant `dir`s are resolved against the manifest's parent
/// directory. Returns [`CoreError::NoParticipants`] for an empty `builds`
/// list and [`CoreError::DuplicateParticipant`] when two entries share an id.
pub fn load_manifest(path: &Path) -> Result<CompositeManifest, CoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut manifest: CompositeManifest =
        serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    if manifest.builds.is_empty() {
        return Err(CoreError::NoParticipants {
            path: path.to_path_buf(),
        });
    }

    let mut seen: Vec<&BuildIdentity> = Vec::new();
    for participant in &manifest.builds {
        if seen.contains(&&participant.id) {
            return Err(CoreError::DuplicateParticipant {
                path: path.to_path_buf(),
                identity: participant.id.clone(),
            });
        }
        seen.push(&participant.id);
    }

    let base = path.parent().unwrap_or(Path::new("."));
    for participant in &mut manifest.builds {
        if participant.dir.is_relative() {
            participant.dir = base.join(&participant.dir);
        }
    }

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
