//! # Resolution Context
//!
//! The explicit context every resolution call is made against: the module under
//! edit, the frozen module registry, and the structural resolver for the session.
//!
//! ## Runtime types
//!
//! [`ResolutionContext::resolve_to_runtime_type`] tries, in order, and stops at the
//! first hit:
//!
//! | Tier | Where the qualified name is looked up |
//! |------|----------------------------------------|
//! | 1 | the module under edit |
//! | 2 | the registered module named by the reference's owning module |
//! | 3 | the registered module named by the reference's declaring scope |
//!
//! A generic instantiation then has each argument resolved through the same chain
//! and is closed over them. Any argument miss makes the whole call miss. An array
//! reference resolves its element type and wraps it with the same rank.
//!
//! ## Editable definitions
//!
//! [`ResolutionContext::resolve_to_editable_definition`] first tries structural
//! resolution through the [`MetadataResolver`]; on any [`ResolveError`] it falls
//! back to the registered module named by the declaring scope. It never falls back
//! to the module under edit: local definitions are expected to resolve
//! structurally.
//!
//! ## Thread safety
//!
//! The context owns its registry, so population has necessarily finished before
//! the first call. All operations take `&self` and the context is `Send + Sync`.

use std::sync::Arc;

use insider_types::{RuntimeType, TypeDefinitionHandle, TypeReference};
use tracing::{debug, trace};

use crate::registry::{ModuleEntry, ModuleRegistry};
use crate::structural::MetadataResolver;

pub struct ResolutionContext {
    current: ModuleEntry,
    registry: ModuleRegistry,
    metadata: Arc<dyn MetadataResolver>,
}

impl ResolutionContext {
    pub fn new(
        current: ModuleEntry,
        registry: ModuleRegistry,
        metadata: Arc<dyn MetadataResolver>,
    ) -> Self {
        Self {
            current,
            registry,
            metadata,
        }
    }

    /// The module being woven.
    pub fn current(&self) -> &ModuleEntry {
        &self.current
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Map a metadata reference to a runtime type, closing generic instantiations.
    pub fn resolve_to_runtime_type(&self, reference: &TypeReference) -> Option<RuntimeType> {
        let qualified = reference.qualified_name();
        let resolved = match self.find_runtime_definition(reference, &qualified) {
            Some(ty) => ty,
            None => {
                debug!(reference = %reference, "runtime type not found in any tier");
                return None;
            }
        };

        let element = if reference.is_generic_instance() {
            self.close_generic(reference, resolved)?
        } else {
            resolved
        };
        if !reference.is_array() {
            return Some(element);
        }
        match element.make_array_type(reference.array_rank) {
            Ok(array) => Some(array),
            Err(e) => {
                debug!(reference = %reference, error = %e, "cannot make array type");
                None
            }
        }
    }

    fn close_generic(&self, reference: &TypeReference, open: RuntimeType) -> Option<RuntimeType> {
        let mut arguments = Vec::with_capacity(reference.generic_arguments.len());
        for argument in &reference.generic_arguments {
            match self.resolve_to_runtime_type(argument) {
                Some(ty) => arguments.push(ty),
                None => {
                    debug!(
                        reference = %reference,
                        argument = %argument,
                        "generic argument did not resolve"
                    );
                    return None;
                }
            }
        }

        match open.make_generic_type(arguments) {
            Ok(closed) => Some(closed),
            Err(e) => {
                debug!(reference = %reference, error = %e, "cannot close generic type");
                None
            }
        }
    }

    fn find_runtime_definition(
        &self,
        reference: &TypeReference,
        qualified: &str,
    ) -> Option<RuntimeType> {
        trace!(type_name = %qualified, tier = 1, module = %self.current.name, "runtime lookup");
        if let Some(ty) = self.current.runtime.get_type(qualified) {
            return Some(ty.clone());
        }

        for (tier, module_name) in [(2, &reference.module), (3, &reference.scope)] {
            let Some(entry) = self.registry.lookup(module_name) else {
                continue;
            };
            trace!(type_name = %qualified, tier, module = %module_name, "runtime lookup");
            if let Some(ty) = entry.runtime.get_type(qualified) {
                return Some(ty.clone());
            }
        }
        None
    }

    /// Map a metadata reference to the editable definition it points at.
    ///
    /// Generic instantiations and arrays resolve to their open element definition.
    pub fn resolve_to_editable_definition(
        &self,
        reference: &TypeReference,
    ) -> Option<TypeDefinitionHandle> {
        match self.metadata.resolve(reference) {
            Ok(handle) => return Some(handle),
            Err(e) => {
                trace!(
                    reference = %reference,
                    reason = e.kind(),
                    error = %e,
                    "structural resolution failed, trying registry"
                );
            }
        }

        let entry = self.registry.lookup(&reference.scope)?;
        let handle = TypeDefinitionHandle::find(&entry.metadata, &reference.qualified_name());
        if handle.is_none() {
            debug!(reference = %reference, module = %entry.name, "editable definition not found");
        }
        handle
    }

    /// Map a runtime type back to its editable definition.
    ///
    /// Types whose assembly is not registered are assumed to belong to the module
    /// under edit. Constructed generic types map to their open definition.
    pub fn resolve_editable_definition_from_runtime_type(
        &self,
        ty: &RuntimeType,
    ) -> Option<TypeDefinitionHandle> {
        let metadata = match self.registry.lookup(ty.assembly_name()) {
            Some(entry) => &entry.metadata,
            None => &self.current.metadata,
        };
        TypeDefinitionHandle::find(metadata, &ty.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use insider_types::{EditableModule, TypeDefinition};

    /// Structural resolver that always faults, leaving only the registry tiers.
    struct Faulting;

    impl MetadataResolver for Faulting {
        fn resolve(&self, reference: &TypeReference) -> Result<TypeDefinitionHandle, ResolveError> {
            Err(ResolveError::LoadFailed {
                scope: reference.scope.clone(),
                message: "corrupt image".to_string(),
            })
        }
    }

    fn context() -> ResolutionContext {
        let app = ModuleEntry::from_metadata(
            EditableModule::new("App").with_type(TypeDefinition::new("App", "Program")),
        );
        let mut registry = ModuleRegistry::new();
        registry.register_entry(ModuleEntry::from_metadata(
            EditableModule::new("Lib")
                .with_type(TypeDefinition::new("Lib", "Box`1").with_generic_parameters(["T"])),
        ));
        ResolutionContext::new(app, registry, Arc::new(Faulting))
    }

    fn bound(text: &str) -> TypeReference {
        let mut r = TypeReference::parse(text).unwrap();
        r.bind("App");
        r
    }

    #[test]
    fn test_faulting_structural_tier_falls_back_to_registry() {
        let ctx = context();
        let handle = ctx
            .resolve_to_editable_definition(&bound("[Lib]Lib.Box`1"))
            .expect("registry fallback");
        assert_eq!(handle.module().name, "Lib");
    }

    #[test]
    fn test_editable_fallback_skips_module_under_edit() {
        let ctx = context();
        assert!(ctx.resolve_to_editable_definition(&bound("App.Program")).is_none());
    }

    #[test]
    fn test_runtime_generic_instantiation() {
        let ctx = context();
        let ty = ctx
            .resolve_to_runtime_type(&bound("[Lib]Lib.Box`1<App.Program>"))
            .unwrap();
        assert_eq!(ty.generic_arguments()[0].qualified_name(), "App.Program");
        assert_eq!(ty.assembly_name(), "Lib");
    }

    #[test]
    fn test_runtime_array_keeps_rank() {
        let ctx = context();
        let ty = ctx
            .resolve_to_runtime_type(&bound("[Lib]Lib.Box`1<App.Program[]>[,]"))
            .unwrap();
        assert_eq!(ty.array_rank(), 2);
        assert_eq!(ty.assembly_name(), "Lib");
        assert_eq!(ty.generic_arguments()[0].array_rank(), 1);
        assert_eq!(ty.full_name(), "Lib.Box`1[[App.Program[], App]][,]");

        let handle = ctx
            .resolve_editable_definition_from_runtime_type(&ty)
            .unwrap();
        assert_eq!(handle.full_name(), "Lib.Box`1");
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolutionContext>();
    }
}
