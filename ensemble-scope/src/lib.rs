//! # ensemble-scope
//!
//! Parent-delegating service scopes — the leaf primitive every other layer
//! builds on. A [`ServiceScope`] owns singleton capability instances and
//! lazy providers; lookup resolves in the nearest scope first and walks the
//! parent chain from there. Scopes nest per invocation tier
//! (process → session → composite → build) and release their resources when
//! they are dropped.

pub mod error;
pub mod scope;

pub use error::ScopeError;
pub use scope::{Releasable, ServiceScope};
