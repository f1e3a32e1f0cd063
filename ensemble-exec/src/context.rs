//! Cross-build composite context.
//!
//! The context describes the full participant set of one composite
//! invocation plus the designated target. It is derived strictly from the
//! declared participants — same ordered set and target always yield an
//! equivalent context — and is handed to the dependency-resolution
//! collaborator as a read-only lookup: given a logical identity, which
//! sibling participant's live output substitutes for a repository artifact.

use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};

use ensemble_core::types::{BuildIdentity, ParticipantBuild};

use crate::error::ExecError;

// ---------------------------------------------------------------------------
// CompositeContext
// ---------------------------------------------------------------------------

/// Sealed description of one composite invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeContext {
    participants: Vec<ParticipantBuild>,
    target: ParticipantBuild,
    fingerprint: String,
}

impl CompositeContext {
    pub fn participants(&self) -> &[ParticipantBuild] {
        &self.participants
    }

    pub fn target(&self) -> &ParticipantBuild {
        &self.target
    }

    /// Stable SHA-256 digest over the ordered participant set and target.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Substitution lookup: the participant whose live output stands in for
    /// artifacts published under `identity`, if any.
    pub fn participant_for(&self, identity: &BuildIdentity) -> Option<&ParticipantBuild> {
        self.participants.iter().find(|p| &p.identity == identity)
    }
}

// ---------------------------------------------------------------------------
// CompositeContextBuilder
// ---------------------------------------------------------------------------

/// Builds [`CompositeContext`]s from the declared participant list.
///
/// Registered into the composite-aware scope seeded with the invocation's
/// full participant list; deterministic for a given list and target.
#[derive(Debug, Clone)]
pub struct CompositeContextBuilder {
    builds: Vec<ParticipantBuild>,
}

impl CompositeContextBuilder {
    pub fn new(builds: Vec<ParticipantBuild>) -> Self {
        Self { builds }
    }

    pub fn builds(&self) -> &[ParticipantBuild] {
        &self.builds
    }

    /// The declared participant with the given identity, or
    /// [`ExecError::UnknownParticipant`].
    pub fn participant(&self, identity: &BuildIdentity) -> Result<&ParticipantBuild, ExecError> {
        self.builds
            .iter()
            .find(|p| &p.identity == identity)
            .ok_or_else(|| ExecError::UnknownParticipant {
                target: identity.clone(),
                known: self.builds.iter().map(|p| p.identity.clone()).collect(),
            })
    }

    /// Build the sealed context for `target`.
    ///
    /// Fails with [`ExecError::UnknownParticipant`] if `target` is not among
    /// the declared builds.
    pub fn build(&self, target: &BuildIdentity) -> Result<CompositeContext, ExecError> {
        let target = self.participant(target)?.clone();
        let fingerprint = fingerprint(&self.builds, &target.identity);
        Ok(CompositeContext {
            participants: self.builds.clone(),
            target,
            fingerprint,
        })
    }
}

fn fingerprint(participants: &[ParticipantBuild], target: &BuildIdentity) -> String {
    let mut hasher = Sha256::new();
    for participant in participants {
        hasher.update(participant.identity.0.as_bytes());
        hasher.update([0u8]);
        hasher.update(participant.root_dir.to_string_lossy().as_bytes());
        hasher.update([b'\n']);
    }
    hasher.update(target.0.as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// CompositeContextCell
// ---------------------------------------------------------------------------

/// The capability registered into the composite-aware scope.
///
/// Starts empty; the first successful [`populate`](Self::populate) seals the
/// context and later calls return the same instance. Downstream resolution
/// logic reads it through [`current`](Self::current) — the cell stays empty
/// until something actually needs the substitution data.
#[derive(Debug, Default)]
pub struct CompositeContextCell {
    inner: Mutex<Option<Arc<CompositeContext>>>,
}

impl CompositeContextCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The populated context, if any.
    pub fn current(&self) -> Option<Arc<CompositeContext>> {
        self.lock().clone()
    }

    /// Build and store the context; memoized, first successful build wins.
    pub fn populate(
        &self,
        builder: &CompositeContextBuilder,
        target: &BuildIdentity,
    ) -> Result<Arc<CompositeContext>, ExecError> {
        let mut inner = self.lock();
        if let Some(existing) = inner.as_ref() {
            return Ok(existing.clone());
        }
        let context = Arc::new(builder.build(target)?);
        *inner = Some(context.clone());
        Ok(context)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<CompositeContext>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
