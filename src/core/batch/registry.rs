//! Batch Provider Registry
//!
//! Ordered name -> adapter map owned by a single orchestrator, plus the
//! one-shot gate used for deferred registration.

use super::adapter::BatchProviderAdapter;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Registry of batch provider adapters, in registration order
#[derive(Default)]
pub struct BatchProviderRegistry {
    adapters: Vec<Arc<dyn BatchProviderAdapter>>,
}

impl BatchProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name; an existing entry with the same
    /// name is replaced in place
    pub fn register(&mut self, adapter: Arc<dyn BatchProviderAdapter>) {
        let name = adapter.name().to_string();
        match self.adapters.iter_mut().find(|a| a.name() == name) {
            Some(slot) => {
                debug!(provider = %name, "Replacing registered batch provider");
                *slot = adapter;
            }
            None => {
                debug!(provider = %name, "Registering batch provider");
                self.adapters.push(adapter);
            }
        }
    }

    /// Get adapter by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn BatchProviderAdapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.iter().any(|a| a.name() == name)
    }

    /// Remove adapter by name
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn BatchProviderAdapter>> {
        let index = self.adapters.iter().position(|a| a.name() == name)?;
        Some(self.adapters.remove(index))
    }

    /// Registered names in registration order
    pub fn list(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// All adapters in registration order
    pub fn all(&self) -> Vec<Arc<dyn BatchProviderAdapter>> {
        self.adapters.clone()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for BatchProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProviderRegistry")
            .field("provider_count", &self.adapters.len())
            .field("providers", &self.list())
            .finish()
    }
}

/// Deferred provider initializer; returns the adapters to register
pub type ProviderInitializer = Box<dyn FnOnce() -> Vec<Arc<dyn BatchProviderAdapter>> + Send>;

/// One-shot gate for deferred provider registration.
///
/// The stored initializer runs at most once, on the first call to
/// [`ProviderInitGate::ensure_initialized`].
pub struct ProviderInitGate {
    initialized: AtomicBool,
    initializer: Mutex<Option<ProviderInitializer>>,
}

impl ProviderInitGate {
    /// Gate with nothing to run
    pub fn ready() -> Self {
        Self {
            initialized: AtomicBool::new(true),
            initializer: Mutex::new(None),
        }
    }

    /// Gate that runs `initializer` on first use
    pub fn deferred(initializer: ProviderInitializer) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            initializer: Mutex::new(Some(initializer)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Run the stored initializer if it has not run yet and hand its adapters
    /// to `register`. Concurrent callers block until the first one finishes.
    pub fn ensure_initialized<F>(&self, register: F)
    where
        F: FnOnce(Vec<Arc<dyn BatchProviderAdapter>>),
    {
        if self.is_initialized() {
            return;
        }

        let mut slot = self.initializer.lock();
        if let Some(initializer) = slot.take() {
            let adapters = initializer();
            debug!(count = adapters.len(), "Running deferred batch provider registration");
            register(adapters);
        }
        self.initialized.store(true, Ordering::Release);
    }
}

impl Default for ProviderInitGate {
    fn default() -> Self {
        Self::ready()
    }
}

impl std::fmt::Debug for ProviderInitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderInitGate")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
