//! Module registry.
//!
//! Holds, for every module participating in a weave, the pair of handles the
//! resolver needs: the runtime view and the editable metadata view. Entries are
//! keyed by module name. The registry is populated before any resolution starts
//! and is read-only afterwards; [`ResolutionContext`](crate::ResolutionContext)
//! takes it by value to make that ordering explicit.

use std::collections::HashMap;
use std::sync::Arc;

use insider_types::{EditableModule, RuntimeModule};
use tracing::warn;

/// Runtime and metadata handles for one module.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub name: String,
    pub runtime: Arc<RuntimeModule>,
    pub metadata: Arc<EditableModule>,
}

impl ModuleEntry {
    pub fn new(
        name: impl Into<String>,
        runtime: Arc<RuntimeModule>,
        metadata: Arc<EditableModule>,
    ) -> Self {
        Self {
            name: name.into(),
            runtime,
            metadata,
        }
    }

    /// Build both views from a module's metadata.
    pub fn from_metadata(metadata: EditableModule) -> Self {
        let runtime = RuntimeModule::from_metadata(&metadata);
        Self {
            name: metadata.name.clone(),
            runtime: Arc::new(runtime),
            metadata: Arc::new(metadata),
        }
    }
}

/// Module name -> [`ModuleEntry`].
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    entries: HashMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `name`.
    ///
    /// Returns the replaced entry, if any. Later registrations win.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        runtime: Arc<RuntimeModule>,
        metadata: Arc<EditableModule>,
    ) -> Option<ModuleEntry> {
        let name = name.into();
        let entry = ModuleEntry::new(name.clone(), runtime, metadata);
        let previous = self.entries.insert(name.clone(), entry);
        if previous.is_some() {
            warn!(module = %name, "module registered twice, overwriting previous entry");
        }
        previous
    }

    /// Register a prepared entry under its own name.
    pub fn register_entry(&mut self, entry: ModuleEntry) -> Option<ModuleEntry> {
        let ModuleEntry {
            name,
            runtime,
            metadata,
        } = entry;
        self.register(name, runtime, metadata)
    }

    pub fn lookup(&self, name: &str) -> Option<&ModuleEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
