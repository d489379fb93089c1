//! Module image IO.
//!
//! Module images are JSON documents holding an [`EditableModule`]. Type references
//! inside an image are written in text form (`[Scope]Ns.Name<Args>`); a reference
//! without a scope points into the image's own module. [`read_module`] binds every
//! reference to the module it was read from, so the rest of the weaver never sees
//! an unbound reference.
//!
//! [`DirectoryAssemblyResolver`] finds modules on demand by name, looking for
//! `<name>.json` in a list of search directories, and caches what it loads. Names
//! that would leave a search directory are rejected.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use insider_resolver::{AssemblyResolver, ResolveError};
use insider_types::EditableModule;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

/// File extension of module images.
pub const IMAGE_EXTENSION: &str = "json";

/// Read a module image and bind its references to the module.
pub fn read_module(path: &Path) -> Result<EditableModule> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut module: EditableModule = serde_json::from_str(&text)
        .with_context(|| format!("parse module image {}", path.display()))?;
    if module.name.is_empty() {
        return Err(anyhow!("module image {} has no name", path.display()));
    }
    module.bind_references();
    debug!(module = %module.name, path = %path.display(), types = module.types.len(), "loaded module image");
    Ok(module)
}

/// Write `module` as a pretty-printed image, creating parent directories.
pub fn write_module(module: &EditableModule, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(module)
        .with_context(|| format!("serialize module {}", module.name))?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    debug!(module = %module.name, path = %path.display(), "saved module image");
    Ok(())
}

/// Loads modules by name from `<dir>/<name>.json`.
///
/// Search directories are tried in order. Loaded modules are cached for the life
/// of the resolver, so every structural lookup into a module sees the same
/// metadata.
#[derive(Debug, Default)]
pub struct DirectoryAssemblyResolver {
    search_dirs: Vec<PathBuf>,
    cache: RwLock<HashMap<String, Arc<EditableModule>>>,
}

impl DirectoryAssemblyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `dir` to the search path, ignoring duplicates.
    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.search_dirs.contains(&dir) {
            self.search_dirs.push(dir);
        }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.add_search_dir(dir);
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Make an already loaded module available without touching the disk.
    pub fn preload(&self, module: Arc<EditableModule>) {
        trace!(module = %module.name, "preloading module");
        self.cache.write().insert(module.name.clone(), module);
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }

    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}

/// `<name>.json`, provided it is a single plain path component.
fn image_file_name(name: &str) -> Option<String> {
    if name.trim().is_empty()
        || matches!(name, "." | "..")
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
    {
        return None;
    }
    let file_name = format!("{}.{}", name, IMAGE_EXTENSION);
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(file_name),
        _ => None,
    }
}

impl AssemblyResolver for DirectoryAssemblyResolver {
    fn resolve_assembly(&self, name: &str) -> Result<Arc<EditableModule>, ResolveError> {
        let file_name = image_file_name(name).ok_or_else(|| ResolveError::ScopeUnavailable {
            scope: name.to_string(),
            reason: "not a valid module name".to_string(),
        })?;
        if let Some(module) = self.cache.read().get(name) {
            return Ok(Arc::clone(module));
        }

        let path = self
            .locate(&file_name)
            .ok_or_else(|| ResolveError::ScopeUnavailable {
                scope: name.to_string(),
                reason: "no module image in search path".to_string(),
            })?;

        let module = read_module(&path).map_err(|e| ResolveError::LoadFailed {
            scope: name.to_string(),
            message: format!("{:#}", e),
        })?;
        if module.name != name {
            warn!(
                expected = %name,
                found = %module.name,
                path = %path.display(),
                "module image declares a different name"
            );
            return Err(ResolveError::LoadFailed {
                scope: name.to_string(),
                message: format!("{} declares module {}", path.display(), module.name),
            });
        }

        // Another reader may have loaded the same module meanwhile; keep the first.
        let mut cache = self.cache.write();
        let cached = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(module));
        Ok(Arc::clone(cached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insider_types::{AttributeValue, TypeDefinition, TypeReference};
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, contents: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_module_binds_references() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "Acme.Weavers.json",
            r#"{
                "name": "Acme.Weavers",
                "types": [
                    { "namespace": "Acme.Weavers", "name": "TraceAttribute",
                      "base_type": "[Insider]Insider.WeaverAttribute" },
                    { "namespace": "Acme.Weavers", "name": "LoudTraceAttribute",
                      "base_type": "Acme.Weavers.TraceAttribute" }
                ]
            }"#,
        );

        let module = read_module(&path).unwrap();
        let trace = module.get_type("Acme.Weavers.TraceAttribute").unwrap();
        let base = trace.base_type.as_ref().unwrap();
        assert_eq!(base.scope, "Insider");
        assert_eq!(base.module, "Acme.Weavers");

        let loud = module.get_type("Acme.Weavers.LoudTraceAttribute").unwrap();
        assert_eq!(loud.base_type.as_ref().unwrap().scope, "Acme.Weavers");
    }

    #[test]
    fn test_read_module_with_array_typed_argument() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "Acme.App.json",
            r#"{
                "name": "Acme.App",
                "types": [{
                    "namespace": "Acme.App",
                    "name": "Program",
                    "custom_attributes": [{
                        "attribute_type": "[Acme.Weavers]Acme.Weavers.RetryAttribute",
                        "arguments": [{
                            "type": "[mscorlib]System.Int32[]",
                            "value": { "kind": "array", "value": [
                                { "value": { "kind": "i32", "value": 1 } },
                                { "value": { "kind": "i32", "value": 5 } }
                            ] }
                        }, {
                            "value": { "kind": "type", "value": "Acme.App.Grid[,]" }
                        }]
                    }]
                }]
            }"#,
        );

        let module = read_module(&path).unwrap();
        let attribute = &module.get_type("Acme.App.Program").unwrap().custom_attributes[0];
        let vector = attribute.arguments[0].arg_type.as_ref().unwrap();
        assert_eq!(vector.array_rank, 1);
        assert_eq!(vector.scope, "mscorlib");
        assert_eq!(vector.module, "Acme.App");
        assert_eq!(vector.to_string(), "[mscorlib]System.Int32[]");

        match &attribute.arguments[1].value {
            AttributeValue::Type(grid) => {
                assert_eq!(grid.array_rank, 2);
                assert_eq!(grid.scope, "Acme.App");
            }
            other => panic!("expected type value, got {:?}", other),
        }

        let saved = dir.path().join("out/Acme.App.json");
        write_module(&module, &saved).unwrap();
        assert_eq!(read_module(&saved).unwrap(), module);
    }

    #[test]
    fn test_read_module_errors() {
        let dir = TempDir::new().unwrap();
        assert!(read_module(&dir.path().join("missing.json")).is_err());

        let bad = write(dir.path(), "bad.json", "{ not json");
        let err = read_module(&bad).unwrap_err();
        assert!(format!("{:#}", err).contains("parse module image"));

        let unnamed = write(dir.path(), "unnamed.json", r#"{"name": ""}"#);
        assert!(read_module(&unnamed).is_err());
    }

    #[test]
    fn test_write_then_read_preserves_module() {
        let dir = TempDir::new().unwrap();
        let module = EditableModule::new("Acme.App").with_type(
            TypeDefinition::new("Acme.App", "Program")
                .with_base_type(TypeReference::new("System", "Object").with_scope("mscorlib")),
        );
        let path = dir.path().join("out/nested/Acme.App.json");
        write_module(&module, &path).unwrap();

        let mut expected = module.clone();
        expected.bind_references();
        assert_eq!(read_module(&path).unwrap(), expected);
    }

    #[test]
    fn test_directory_resolver_loads_and_caches() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(
            second.path(),
            "Acme.Core.json",
            r#"{"name": "Acme.Core", "types": [{"namespace": "Acme.Core", "name": "Box`1", "generic_parameters": ["T"]}]}"#,
        );

        let resolver = DirectoryAssemblyResolver::new()
            .with_search_dir(first.path())
            .with_search_dir(second.path());
        let a = resolver.resolve_assembly("Acme.Core").unwrap();
        let b = resolver.resolve_assembly("Acme.Core").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resolver.cached_count(), 1);
    }

    #[test]
    fn test_directory_resolver_failures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Broken.json", "[]");
        write(dir.path(), "Renamed.json", r#"{"name": "Other"}"#);
        let resolver = DirectoryAssemblyResolver::new().with_search_dir(dir.path());

        assert_eq!(
            resolver.resolve_assembly("Missing").unwrap_err().kind(),
            "scope_unavailable"
        );
        assert_eq!(
            resolver.resolve_assembly("Broken").unwrap_err().kind(),
            "load_failed"
        );
        assert_eq!(
            resolver.resolve_assembly("Renamed").unwrap_err().kind(),
            "load_failed"
        );
    }

    #[test]
    fn test_directory_resolver_stays_inside_search_dirs() {
        let root = TempDir::new().unwrap();
        let search = root.path().join("search");
        fs::create_dir_all(search.join("nested")).unwrap();
        write(root.path(), "Outside.json", r#"{"name": "../Outside"}"#);
        write(&search, "nested/Inner.json", r#"{"name": "nested/Inner"}"#);
        let resolver = DirectoryAssemblyResolver::new().with_search_dir(&search);

        for name in ["../Outside", "nested/Inner", "nested\\Inner", "..", "", " "] {
            let err = resolver.resolve_assembly(name).unwrap_err();
            assert_eq!(err.kind(), "scope_unavailable", "{:?}", name);
        }
        assert_eq!(resolver.cached_count(), 0);
    }

    #[test]
    fn test_preloaded_module_skips_disk() {
        let resolver = DirectoryAssemblyResolver::new();
        resolver.preload(Arc::new(EditableModule::new("Acme.Models")));
        assert!(resolver.resolve_assembly("Acme.Models").is_ok());
    }
}
