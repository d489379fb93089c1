//! Weave session lifecycle.
//!
//! A session owns everything one weave needs:
//!
//! ```text
//!   open(target, references, settings)
//!     │
//!     ├─ read target image            ──► module under edit
//!     ├─ read each reference image    ──► ModuleRegistry (last write wins)
//!     ├─ search dirs of all images    ──► DirectoryAssemblyResolver
//!     └─ freeze registry + resolver   ──► ResolutionContext
//!
//!   Weaver::process(&session)          read-only resolution
//!   save(path)                         write the target image
//! ```
//!
//! Registration always finishes before the context exists, so every resolution
//! call sees the final registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use insider_core::{Settings, WeaveSettings};
use insider_resolver::{
    AssemblyResolver, ModuleEntry, ModuleRegistry, ResolutionContext, ScopeResolver,
};
use insider_types::EditableModule;
use tracing::{debug, info};

use crate::loader::{read_module, write_module, DirectoryAssemblyResolver};

pub struct WeaveSession {
    settings: Settings,
    weave_settings: WeaveSettings,
    context: ResolutionContext,
}

impl WeaveSession {
    /// Open `target` with its `references`, all given as module image paths.
    ///
    /// Modules the references mention but that are not listed are looked up on
    /// demand next to the target and the listed references.
    pub fn open<P: AsRef<Path>>(target: P, references: &[PathBuf], settings: Settings) -> Result<Self> {
        let target = target.as_ref();
        let module = read_module(target).context("load target module")?;

        let mut assemblies = DirectoryAssemblyResolver::new();
        assemblies.add_search_dir(parent_dir(target));

        let mut loaded = Vec::with_capacity(references.len());
        for path in references {
            let reference = read_module(path)
                .with_context(|| format!("load reference {}", path.display()))?;
            assemblies.add_search_dir(parent_dir(path));
            loaded.push(reference);
        }

        let assemblies = Arc::new(assemblies);
        let session = Self::new(module, loaded, Arc::clone(&assemblies), settings);
        let registry = session.context.registry();
        for name in registry.names() {
            if let Some(entry) = registry.lookup(&name) {
                assemblies.preload(Arc::clone(&entry.metadata));
            }
        }
        info!(
            target = %session.target().name,
            references = registry.len(),
            "weave session opened"
        );
        Ok(session)
    }

    /// Build a session from modules already in memory.
    ///
    /// `assemblies` serves structural lookups into modules outside `references`.
    pub fn new<A>(
        target: EditableModule,
        references: Vec<EditableModule>,
        assemblies: A,
        settings: Settings,
    ) -> Self
    where
        A: AssemblyResolver + 'static,
    {
        let weave_settings = WeaveSettings::from_settings(&settings);

        let mut registry = ModuleRegistry::new();
        for reference in references {
            debug!(module = %reference.name, "registering reference");
            registry.register_entry(ModuleEntry::from_metadata(reference));
        }

        let current = ModuleEntry::from_metadata(target);
        let structural = ScopeResolver::new(Arc::clone(&current.metadata), assemblies);
        let context = ResolutionContext::new(current, registry, Arc::new(structural));

        Self {
            settings,
            weave_settings,
            context,
        }
    }

    /// The module under edit.
    pub fn target(&self) -> &EditableModule {
        &self.context.current().metadata
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn weave_settings(&self) -> &WeaveSettings {
        &self.weave_settings
    }

    /// Write the target image to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_module(self.target(), path)
            .with_context(|| format!("save {}", self.target().name))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
