//! Editable module metadata.
//!
//! An [`EditableModule`] is the structural, serializable view of a module: its
//! type definitions with their methods and custom attributes. Resolution hands out
//! [`TypeDefinitionHandle`]s, which keep the owning module alive and dereference to
//! the definition they point at.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::definition::TypeDefinition;
use crate::runtime::RuntimeType;
use crate::type_ref::TypeReference;

/// Structural metadata of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableModule {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl EditableModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.types.push(definition);
        self
    }

    /// Look up a definition by its `Namespace.Name`.
    pub fn get_type(&self, full_name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.full_name() == full_name)
    }

    /// The definition behind a runtime type, matched by `Namespace.Name`.
    ///
    /// Constructed generics and arrays map to their open element definition. The
    /// runtime type's assembly is not checked against this module's name.
    pub fn find_type(&self, ty: &RuntimeType) -> Option<&TypeDefinition> {
        self.get_type(&ty.qualified_name())
    }

    pub fn get_type_mut(&mut self, full_name: &str) -> Option<&mut TypeDefinition> {
        self.types.iter_mut().find(|t| t.full_name() == full_name)
    }

    fn type_index(&self, full_name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.full_name() == full_name)
    }

    /// Attach every type reference in the module to this module.
    ///
    /// Called once after reading an image, so that references know which module
    /// they were read from and local references carry an explicit scope.
    pub fn bind_references(&mut self) {
        let name = self.name.clone();
        for definition in &mut self.types {
            if let Some(base) = definition.base_type.as_mut() {
                base.bind(&name);
            }
            let attributes = definition.custom_attributes.iter_mut().chain(
                definition
                    .methods
                    .iter_mut()
                    .flat_map(|m| m.custom_attributes.iter_mut()),
            );
            for attribute in attributes {
                attribute.attribute_type.bind(&name);
                for argument in &mut attribute.arguments {
                    bind_argument(argument, &name);
                }
            }
        }
    }
}

fn bind_argument(argument: &mut crate::attribute::CustomAttributeArgument, module: &str) {
    use crate::attribute::AttributeValue;

    if let Some(arg_type) = argument.arg_type.as_mut() {
        arg_type.bind(module);
    }
    match &mut argument.value {
        AttributeValue::Type(reference) => reference.bind(module),
        AttributeValue::Boxed(inner) => bind_argument(inner, module),
        AttributeValue::Array(items) => {
            for item in items {
                bind_argument(item, module);
            }
        }
        _ => {}
    }
}

/// Handle to a type definition inside a shared module.
#[derive(Clone)]
pub struct TypeDefinitionHandle {
    module: Arc<EditableModule>,
    index: usize,
}

impl TypeDefinitionHandle {
    /// Find `full_name` in `module`.
    pub fn find(module: &Arc<EditableModule>, full_name: &str) -> Option<Self> {
        module.type_index(full_name).map(|index| Self {
            module: Arc::clone(module),
            index,
        })
    }

    /// The module that defines this type.
    pub fn module(&self) -> &Arc<EditableModule> {
        &self.module
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.module.types[self.index]
    }

    /// A reference to this definition as seen from `from_module`.
    pub fn to_reference(&self, from_module: &str) -> TypeReference {
        let def = self.definition();
        TypeReference::new(def.namespace.clone(), def.name.clone())
            .with_scope(self.module.name.clone())
            .in_module(from_module)
    }
}

impl Deref for TypeDefinitionHandle {
    type Target = TypeDefinition;

    fn deref(&self) -> &Self::Target {
        self.definition()
    }
}

impl PartialEq for TypeDefinitionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.module.name == other.module.name && self.index == other.index
    }
}

impl fmt::Debug for TypeDefinitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.module.name, self.definition().full_name())
    }
}
