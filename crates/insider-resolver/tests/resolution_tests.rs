//! Integration tests for insider-resolver.
//!
//! These tests build a small weave session (an application module, a core library
//! and a models library) and check the fallback chains end to end.

use std::sync::Arc;

use insider_resolver::{
    InMemoryAssemblyResolver, ModuleEntry, ModuleRegistry, ResolutionContext, ScopeResolver,
};
use insider_types::{EditableModule, RuntimeType, TypeDefinition, TypeReference};

fn app() -> EditableModule {
    EditableModule::new("Acme.App")
        .with_type(TypeDefinition::new("Acme.App", "Program"))
        .with_type(TypeDefinition::new("Acme.App", "Item"))
        .with_type(TypeDefinition::new("Acme.Shared", "Config"))
}

fn core() -> EditableModule {
    EditableModule::new("Acme.Core")
        .with_type(TypeDefinition::new("Acme.Core", "Box`1").with_generic_parameters(["T"]))
        .with_type(
            TypeDefinition::new("Acme.Core", "Pair`2").with_generic_parameters(["TLeft", "TRight"]),
        )
        .with_type(TypeDefinition::new("Acme.Shared", "Config"))
}

fn models() -> EditableModule {
    EditableModule::new("Acme.Models").with_type(TypeDefinition::new("Acme.Models", "Order"))
}

/// Build a context for `Acme.App` with the given modules registered and the given
/// modules reachable through structural resolution.
fn session(registered: Vec<EditableModule>, on_disk: Vec<EditableModule>) -> ResolutionContext {
    let current = ModuleEntry::from_metadata(app());
    let mut registry = ModuleRegistry::new();
    for module in registered {
        registry.register_entry(ModuleEntry::from_metadata(module));
    }
    let mut assemblies = InMemoryAssemblyResolver::new();
    for module in on_disk {
        assemblies.add(module);
    }
    let structural = ScopeResolver::new(Arc::clone(&current.metadata), assemblies);
    ResolutionContext::new(current, registry, Arc::new(structural))
}

/// Parse a reference as if read from `module`.
fn reference(text: &str, module: &str) -> TypeReference {
    let mut r = TypeReference::parse(text).expect("valid reference");
    r.bind(module);
    r
}

#[test]
fn test_local_type_resolves_from_module_under_edit() {
    let ctx = session(vec![core(), models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("Acme.App.Program", "Acme.App"))
        .expect("local type");
    assert_eq!(ty.qualified_name(), "Acme.App.Program");
    assert_eq!(ty.assembly_name(), "Acme.App");
}

#[test]
fn test_module_under_edit_wins_over_references() {
    // Acme.Shared.Config is defined both locally and in Acme.Core.
    let ctx = session(vec![core()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Core]Acme.Shared.Config", "Acme.App"))
        .unwrap();
    assert_eq!(ty.assembly_name(), "Acme.App");
}

#[test]
fn test_declaring_scope_tier_resolves_reference_module() {
    let ctx = session(vec![core(), models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Models]Acme.Models.Order", "Acme.App"))
        .expect("scope tier");
    assert_eq!(ty.assembly_name(), "Acme.Models");
}

#[test]
fn test_owning_module_tier_handles_forwarded_scope() {
    // Read from Acme.Models' image, scoped to a facade that is not registered.
    let ctx = session(vec![models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Facade]Acme.Models.Order", "Acme.Models"))
        .expect("owning module tier");
    assert_eq!(ty.assembly_name(), "Acme.Models");
}

/// A registered module that re-exports `Acme.Models.Order` under its own name.
fn facade() -> EditableModule {
    EditableModule::new("Acme.Facade").with_type(TypeDefinition::new("Acme.Models", "Order"))
}

#[test]
fn test_owning_module_tier_runs_before_declaring_scope_tier() {
    // Both tiers can answer; the owning module must win.
    let ctx = session(vec![facade(), models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Facade]Acme.Models.Order", "Acme.Models"))
        .unwrap();
    assert_eq!(ty.assembly_name(), "Acme.Models");

    // Read from the unregistered module under edit, only the scope tier is left.
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Facade]Acme.Models.Order", "Acme.App"))
        .unwrap();
    assert_eq!(ty.assembly_name(), "Acme.Facade");
}

#[test]
fn test_array_of_generic_instance_resolves_with_rank() {
    let ctx = session(vec![core(), models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference(
            "[Acme.Core]Acme.Core.Box`1<[Acme.Models]Acme.Models.Order>[]",
            "Acme.App",
        ))
        .unwrap();
    assert!(ty.is_array());
    assert_eq!(ty.element_type().generic_arguments()[0].assembly_name(), "Acme.Models");
}

#[test]
fn test_unregistering_reference_module_makes_resolution_miss() {
    let order = reference("[Acme.Models]Acme.Models.Order", "Acme.App");
    assert!(session(vec![models()], vec![])
        .resolve_to_runtime_type(&order)
        .is_some());
    assert!(session(vec![], vec![])
        .resolve_to_runtime_type(&order)
        .is_none());
}

#[test]
fn test_unknown_module_is_a_miss() {
    let ctx = session(vec![core()], vec![]);
    assert!(ctx
        .resolve_to_runtime_type(&reference("[mscorlib]System.String", "Acme.App"))
        .is_none());
}

#[test]
fn test_generic_instantiation_closes_over_arguments() {
    let ctx = session(vec![core(), models()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference(
            "[Acme.Core]Acme.Core.Box`1<[Acme.Models]Acme.Models.Order>",
            "Acme.App",
        ))
        .expect("closed generic");

    let open = RuntimeType::definition("Acme.Core", "Acme.Core", "Box`1", 1);
    let order = RuntimeType::definition("Acme.Models", "Acme.Models", "Order", 0);
    assert_eq!(ty, open.make_generic_type(vec![order]).unwrap());
    assert_eq!(ty.full_name(), "Acme.Core.Box`1[[Acme.Models.Order, Acme.Models]]");
}

#[test]
fn test_nested_generic_instantiation() {
    let ctx = session(vec![core()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference(
            "[Acme.Core]Acme.Core.Pair`2<Acme.App.Item, [Acme.Core]Acme.Core.Box`1<Acme.App.Program>>",
            "Acme.App",
        ))
        .expect("nested generic");
    assert_eq!(ty.generic_arguments().len(), 2);
    assert!(ty.generic_arguments()[1].is_constructed_generic_type());
}

#[test]
fn test_generic_with_unresolved_argument_is_a_miss() {
    let ctx = session(vec![core()], vec![]);
    assert!(ctx
        .resolve_to_runtime_type(&reference(
            "[Acme.Core]Acme.Core.Box`1<[Acme.Models]Acme.Models.Order>",
            "Acme.App",
        ))
        .is_none());
}

#[test]
fn test_generic_with_wrong_arity_is_a_miss() {
    let ctx = session(vec![core()], vec![]);
    assert!(ctx
        .resolve_to_runtime_type(&reference(
            "[Acme.Core]Acme.Core.Box`1<Acme.App.Item, Acme.App.Program>",
            "Acme.App",
        ))
        .is_none());
}

#[test]
fn test_editable_definition_resolves_structurally() {
    // Nothing registered: only the structural tier can succeed.
    let ctx = session(vec![], vec![core()]);
    let handle = ctx
        .resolve_to_editable_definition(&reference("[Acme.Core]Acme.Core.Box`1", "Acme.App"))
        .expect("structural tier");
    assert_eq!(handle.module().name, "Acme.Core");
    assert_eq!(handle.generic_parameters, vec!["T".to_string()]);

    let local = ctx
        .resolve_to_editable_definition(&reference("Acme.App.Program", "Acme.App"))
        .expect("local definition");
    assert_eq!(local.module().name, "Acme.App");
}

#[test]
fn test_editable_definition_falls_back_to_registry() {
    let ctx = session(vec![models()], vec![]);
    let handle = ctx
        .resolve_to_editable_definition(&reference("[Acme.Models]Acme.Models.Order", "Acme.App"))
        .expect("registry tier");
    assert_eq!(handle.module().name, "Acme.Models");
    assert_eq!(handle.full_name(), "Acme.Models.Order");
}

#[test]
fn test_editable_definition_of_generic_instance_is_open_definition() {
    let ctx = session(vec![core()], vec![]);
    let handle = ctx
        .resolve_to_editable_definition(&reference(
            "[Acme.Core]Acme.Core.Box`1<Acme.App.Item>",
            "Acme.App",
        ))
        .unwrap();
    assert_eq!(handle.full_name(), "Acme.Core.Box`1");
}

#[test]
fn test_editable_definition_miss() {
    let ctx = session(vec![core()], vec![core()]);
    assert!(ctx
        .resolve_to_editable_definition(&reference("[Acme.Models]Acme.Models.Order", "Acme.App"))
        .is_none());
    assert!(ctx
        .resolve_to_editable_definition(&reference("[Acme.Core]Acme.Core.Missing", "Acme.App"))
        .is_none());
}

#[test]
fn test_editable_definition_from_registered_runtime_type() {
    let ctx = session(vec![core()], vec![]);
    let ty = ctx
        .resolve_to_runtime_type(&reference("[Acme.Core]Acme.Core.Box`1<Acme.App.Item>", "Acme.App"))
        .unwrap();
    let handle = ctx
        .resolve_editable_definition_from_runtime_type(&ty)
        .expect("open definition in registered module");
    assert_eq!(handle.module().name, "Acme.Core");
    assert_eq!(handle.full_name(), "Acme.Core.Box`1");
}

#[test]
fn test_editable_definition_from_unregistered_assembly_uses_module_under_edit() {
    let ctx = session(vec![core()], vec![]);
    let local = RuntimeType::definition("Acme.App", "Acme.App", "Item", 0);
    let handle = ctx
        .resolve_editable_definition_from_runtime_type(&local)
        .expect("module under edit");
    assert_eq!(handle.module().name, "Acme.App");

    let foreign = RuntimeType::definition("System.Runtime", "System", "String", 0);
    assert!(ctx
        .resolve_editable_definition_from_runtime_type(&foreign)
        .is_none());
}

#[test]
fn test_concurrent_reads_after_population() {
    let ctx = Arc::new(session(vec![core(), models()], vec![core()]));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                let r = reference(
                    "[Acme.Core]Acme.Core.Box`1<[Acme.Models]Acme.Models.Order>",
                    "Acme.App",
                );
                ctx.resolve_to_runtime_type(&r).is_some()
                    && ctx.resolve_to_editable_definition(&r).is_some()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("thread"));
    }
}
