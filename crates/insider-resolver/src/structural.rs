//! Structural resolution of type references.
//!
//! This is the first tier of editable-definition resolution: follow the
//! reference's declaring scope to the module that defines it and look the type up
//! there, without consulting the registry.
//!
//! ```text
//! ┌──────────────────────┐
//! │   MetadataResolver   │  ◄── trait the resolution context calls
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐     scope == module under edit
//! │    ScopeResolver     │ ──────────────────────────────► target metadata
//! └──────────┬───────────┘
//!            │ otherwise
//!            ▼
//! ┌──────────────────────┐
//! │   AssemblyResolver   │  ◄── in-memory, directory-backed, ...
//! └──────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use insider_types::{EditableModule, TypeDefinitionHandle, TypeReference};
use tracing::trace;

use crate::error::ResolveError;

// =============================================================================
// Traits
// =============================================================================

/// Resolves a type reference within its own metadata graph.
pub trait MetadataResolver: Send + Sync {
    fn resolve(&self, reference: &TypeReference) -> Result<TypeDefinitionHandle, ResolveError>;
}

/// Locates the metadata of a module by its simple name.
///
/// # Example
/// ```
/// use insider_resolver::{AssemblyResolver, InMemoryAssemblyResolver};
/// use insider_types::EditableModule;
///
/// let mut assemblies = InMemoryAssemblyResolver::new();
/// assemblies.add(EditableModule::new("Acme.Core"));
/// assert!(assemblies.resolve_assembly("Acme.Core").is_ok());
/// assert!(assemblies.resolve_assembly("Acme.Missing").is_err());
/// ```
pub trait AssemblyResolver: Send + Sync {
    fn resolve_assembly(&self, name: &str) -> Result<Arc<EditableModule>, ResolveError>;
}

impl<T: AssemblyResolver + ?Sized> AssemblyResolver for Arc<T> {
    fn resolve_assembly(&self, name: &str) -> Result<Arc<EditableModule>, ResolveError> {
        (**self).resolve_assembly(name)
    }
}

// =============================================================================
// ScopeResolver
// =============================================================================

/// Follows a reference's declaring scope: the module under edit resolves directly,
/// any other scope goes through an [`AssemblyResolver`].
pub struct ScopeResolver<A> {
    target: Arc<EditableModule>,
    assemblies: A,
}

impl<A: AssemblyResolver> ScopeResolver<A> {
    pub fn new(target: Arc<EditableModule>, assemblies: A) -> Self {
        Self { target, assemblies }
    }

    pub fn assemblies(&self) -> &A {
        &self.assemblies
    }

    fn scope_module(&self, scope: &str) -> Result<Arc<EditableModule>, ResolveError> {
        if scope == self.target.name {
            return Ok(Arc::clone(&self.target));
        }
        self.assemblies.resolve_assembly(scope)
    }
}

impl<A: AssemblyResolver> MetadataResolver for ScopeResolver<A> {
    fn resolve(&self, reference: &TypeReference) -> Result<TypeDefinitionHandle, ResolveError> {
        let scope = if reference.scope.is_empty() {
            reference.module.as_str()
        } else {
            reference.scope.as_str()
        };
        if scope.is_empty() {
            return Err(ResolveError::ScopeUnavailable {
                scope: String::new(),
                reason: format!("reference {} is not bound to a module", reference),
            });
        }

        let module = self.scope_module(scope)?;
        // Generic instantiations resolve to their open definition.
        let full_name = reference.qualified_name();
        trace!(scope = %scope, type_name = %full_name, "structural lookup");
        TypeDefinitionHandle::find(&module, &full_name).ok_or_else(|| ResolveError::TypeNotFound {
            full_name,
            scope: scope.to_string(),
        })
    }
}

// =============================================================================
// InMemoryAssemblyResolver
// =============================================================================

/// Assembly resolver over a fixed set of already-loaded modules.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssemblyResolver {
    modules: HashMap<String, Arc<EditableModule>>,
}

impl InMemoryAssemblyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: EditableModule) {
        self.add_shared(Arc::new(module));
    }

    pub fn add_shared(&mut self, module: Arc<EditableModule>) {
        self.modules.insert(module.name.clone(), module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl AssemblyResolver for InMemoryAssemblyResolver {
    fn resolve_assembly(&self, name: &str) -> Result<Arc<EditableModule>, ResolveError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::ScopeUnavailable {
                scope: name.to_string(),
                reason: "not loaded".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insider_types::TypeDefinition;

    fn resolver() -> ScopeResolver<InMemoryAssemblyResolver> {
        let target = Arc::new(
            EditableModule::new("App").with_type(TypeDefinition::new("App", "Program")),
        );
        let mut assemblies = InMemoryAssemblyResolver::new();
        assemblies.add(
            EditableModule::new("Lib")
                .with_type(TypeDefinition::new("Lib", "Box`1").with_generic_parameters(["T"])),
        );
        ScopeResolver::new(target, assemblies)
    }

    fn bound(text: &str) -> TypeReference {
        let mut r = TypeReference::parse(text).unwrap();
        r.bind("App");
        r
    }

    #[test]
    fn test_local_scope_resolves_in_target() {
        let handle = resolver().resolve(&bound("App.Program")).unwrap();
        assert_eq!(handle.module().name, "App");
        assert_eq!(handle.full_name(), "App.Program");
    }

    #[test]
    fn test_foreign_scope_goes_through_assemblies() {
        let handle = resolver().resolve(&bound("[Lib]Lib.Box`1<App.Program>")).unwrap();
        assert_eq!(handle.module().name, "Lib");
        assert_eq!(handle.full_name(), "Lib.Box`1");
    }

    #[test]
    fn test_failure_reasons() {
        let r = resolver();
        assert_eq!(
            r.resolve(&bound("[Missing]Missing.Thing")).unwrap_err().kind(),
            "scope_unavailable"
        );
        assert_eq!(
            r.resolve(&bound("[Lib]Lib.Nope")).unwrap_err(),
            ResolveError::TypeNotFound {
                full_name: "Lib.Nope".to_string(),
                scope: "Lib".to_string(),
            }
        );
        let unbound = TypeReference::new("App", "Program");
        assert_eq!(r.resolve(&unbound).unwrap_err().kind(), "scope_unavailable");
    }
}
