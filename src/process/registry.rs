/*!
 * Process Type Registry
 * Maps stable type names to factories used to rebuild processes at load
 */

use crate::core::types::Pid;
use crate::process::core::traits::Process;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a process instance from `(parent_pid, pid)`
pub type ProcessFactory = Arc<dyn Fn(Pid, Pid) -> Box<dyn Process> + Send + Sync>;

/// Name-to-factory lookup table
///
/// Cloning is cheap and clones share the same table, so workloads can
/// register from their own init code while the kernel holds a handle.
#[derive(Clone, Default)]
pub struct ProcessTypeRegistry {
    factories: Arc<DashMap<String, ProcessFactory, RandomState>>,
}

impl ProcessTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; a later registration under the same name wins
    pub fn register<F>(&self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(Pid, Pid) -> Box<dyn Process> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .factories
            .insert(type_name.clone(), Arc::new(factory))
            .is_some()
        {
            debug!(type_name = %type_name, "Replaced process type registration");
        } else {
            debug!(type_name = %type_name, "Registered process type");
        }
    }

    /// Look up the factory for a type name
    pub fn fetch(&self, type_name: &str) -> Option<ProcessFactory> {
        self.factories
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Forget a type; records naming it are dropped at the next load
    pub fn unregister(&self, type_name: &str) -> bool {
        self.factories.remove(type_name).is_some()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ProcessTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("ProcessTypeRegistry")
            .field("types", &names)
            .finish()
    }
}
