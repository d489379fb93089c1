//! Editable type and method definitions.

use serde::{Deserialize, Serialize};

use crate::attribute::CustomAttribute;
use crate::type_ref::{qualified_name, TypeReference};

/// A type defined in a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
}

impl TypeDefinition {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            generic_parameters: Vec::new(),
            base_type: None,
            methods: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    pub fn with_generic_parameters<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_type(mut self, base: TypeReference) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn with_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// `Namespace.Name`, the key module lookups use.
    pub fn full_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A method defined on a type.
///
/// `rva` is the relative virtual address of the method body inside the module; zero
/// means the module carries no body for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    #[serde(default)]
    pub rva: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>, rva: u32) -> Self {
        Self {
            name: name.into(),
            rva,
            custom_attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}
