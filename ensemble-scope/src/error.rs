//! Error types for ensemble-scope.

use thiserror::Error;

/// All errors that can arise from capability resolution.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The capability is absent from the requesting scope and every parent.
    /// Fatal to the scope that requested it; never retried.
    #[error("no provider for capability {capability} in scope '{scope}' or any parent scope")]
    UnresolvedCapability {
        capability: &'static str,
        scope: String,
    },

    /// A provider resolved its own capability while being constructed.
    #[error("provider for capability {capability} in scope '{scope}' resolves itself during construction")]
    ProviderCycle {
        capability: &'static str,
        scope: String,
    },
}
