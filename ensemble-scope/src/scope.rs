//! Capability-keyed service scopes with parent delegation.
//!
//! # Resolution rules
//!
//! - `get` resolves locally first, then delegates up the parent chain.
//! - The nearest scope's provider always wins (scoped override).
//! - Providers are constructed at most once per scope (singleton-per-scope).
//! - Registration in a child is never visible to its parent, and sibling
//!   scopes never observe each other's registrations.
//!
//! # Teardown
//!
//! Resources registered through the `register_releasable*` functions have
//! [`Releasable::release`] invoked when the scope is dropped — in reverse
//! acquisition order, exactly once, on every exit path including unwinds.
//!
//! Capabilities are keyed by their concrete type. Trait-object services are
//! registered behind a small wrapper struct (e.g. a `FooService(Arc<dyn Foo>)`
//! newtype) so resolution never needs to downcast across trait objects.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::ScopeError;

/// A scope-owned resource that must be released when its scope ends.
pub trait Releasable: Send + Sync {
    fn release(&self);
}

type AnyService = Arc<dyn Any + Send + Sync>;
type ProviderFn = Box<dyn FnOnce() -> (AnyService, Option<Arc<dyn Releasable>>) + Send>;

enum Entry {
    Ready(AnyService),
    /// Lazy provider; `None` while the provider body is running, which is
    /// only observable when the provider resolves its own capability.
    Pending(Option<ProviderFn>),
}

/// One node in the scope hierarchy.
///
/// Scopes are created and owned explicitly by the invocation that needs them
/// and destroyed with it; there is no global registry.
pub struct ServiceScope {
    label: String,
    parent: Option<Arc<ServiceScope>>,
    entries: Mutex<HashMap<TypeId, Entry>>,
    releasables: Mutex<Vec<Arc<dyn Releasable>>>,
}

impl ServiceScope {
    /// Create a scope with no parent (the process tier).
    pub fn root(label: impl Into<String>) -> Arc<ServiceScope> {
        Arc::new(ServiceScope {
            label: label.into(),
            parent: None,
            entries: Mutex::new(HashMap::new()),
            releasables: Mutex::new(Vec::new()),
        })
    }

    /// Create a child scope delegating to `self`.
    ///
    /// Registrations on the child shadow same-keyed capabilities of every
    /// ancestor for lookups through the child.
    pub fn child(self: &Arc<Self>, label: impl Into<String>) -> Arc<ServiceScope> {
        let label = label.into();
        debug!("opening scope '{}' under '{}'", label, self.label);
        Arc::new(ServiceScope {
            label,
            parent: Some(Arc::clone(self)),
            entries: Mutex::new(HashMap::new()),
            releasables: Mutex::new(Vec::new()),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register an eager singleton instance.
    ///
    /// Re-registering the same capability in the same scope replaces the
    /// previous entry.
    pub fn register<T: Any + Send + Sync>(&self, service: T) {
        self.insert::<T>(Entry::Ready(Arc::new(service)));
    }

    /// Register a lazy provider, constructed on first `get` in this scope.
    pub fn register_provider<T, F>(&self, provider: F)
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T + Send + 'static,
    {
        self.insert::<T>(Entry::Pending(Some(Box::new(move || {
            (Arc::new(provider()) as AnyService, None)
        }))));
    }

    /// Register an eager singleton whose `release` runs at scope teardown.
    pub fn register_releasable<T: Releasable + Any>(&self, service: T) {
        let service = Arc::new(service);
        self.lock_releasables().push(service.clone());
        self.insert::<T>(Entry::Ready(service));
    }

    /// Register a lazy provider whose constructed instance is released at
    /// scope teardown (only if it was actually constructed).
    pub fn register_releasable_provider<T, F>(&self, provider: F)
    where
        T: Releasable + Any,
        F: FnOnce() -> T + Send + 'static,
    {
        self.insert::<T>(Entry::Pending(Some(Box::new(move || {
            let service = Arc::new(provider());
            (service.clone() as AnyService, Some(service as Arc<dyn Releasable>))
        }))));
    }

    /// Resolve a capability, walking up the parent chain.
    ///
    /// Fails with [`ScopeError::UnresolvedCapability`] when the key is absent
    /// from the entire chain.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ScopeError> {
        let mut scope = self;
        loop {
            if let Some(service) = scope.resolve_local::<T>()? {
                return Ok(service);
            }
            match scope.parent.as_deref() {
                Some(parent) => scope = parent,
                None => {
                    return Err(ScopeError::UnresolvedCapability {
                        capability: type_name::<T>(),
                        scope: self.label.clone(),
                    })
                }
            }
        }
    }

    fn resolve_local<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>, ScopeError> {
        let key = TypeId::of::<T>();
        let provider = {
            let mut entries = self.lock_entries();
            match entries.get_mut(&key) {
                None => return Ok(None),
                Some(Entry::Ready(service)) => return Ok(service.clone().downcast::<T>().ok()),
                Some(Entry::Pending(provider)) => match provider.take() {
                    Some(provider) => provider,
                    None => {
                        return Err(ScopeError::ProviderCycle {
                            capability: type_name::<T>(),
                            scope: self.label.clone(),
                        })
                    }
                },
            }
        };

        // Construct outside the lock so the provider may resolve other
        // capabilities from this scope.
        let (service, releasable) = provider();
        self.lock_entries().insert(key, Entry::Ready(service.clone()));
        if let Some(releasable) = releasable {
            self.lock_releasables().push(releasable);
        }
        Ok(service.downcast::<T>().ok())
    }

    fn insert<T: Any + Send + Sync>(&self, entry: Entry) {
        self.lock_entries().insert(TypeId::of::<T>(), entry);
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<TypeId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_releasables(&self) -> MutexGuard<'_, Vec<Arc<dyn Releasable>>> {
        self.releasables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ServiceScope {
    fn drop(&mut self) {
        let mut releasables = self.lock_releasables();
        if releasables.is_empty() {
            return;
        }
        debug!(
            "closing scope '{}', releasing {} resource(s)",
            self.label,
            releasables.len()
        );
        for releasable in releasables.drain(..).rev() {
            releasable.release();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
