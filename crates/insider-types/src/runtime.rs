//! Runtime view of modules and types.
//!
//! A [`RuntimeModule`] is the materialized, read-only view of a module used for
//! reflection-style queries. Its [`RuntimeType`]s know their defining assembly and
//! generic arity, and can be closed over generic arguments with
//! [`RuntimeType::make_generic_type`] or wrapped as arrays with
//! [`RuntimeType::make_array_type`].

use std::collections::BTreeMap;
use std::fmt;

use crate::module::EditableModule;
use crate::type_ref::{array_suffix, qualified_name};

/// A loaded type: an open or non-generic definition, a closed generic type, or an
/// array of either.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeType {
    assembly: String,
    namespace: String,
    name: String,
    generic_arity: usize,
    generic_arguments: Vec<RuntimeType>,
    array_rank: usize,
}

impl RuntimeType {
    /// A type definition with `generic_arity` open parameters.
    pub fn definition(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        generic_arity: usize,
    ) -> Self {
        Self {
            assembly: assembly.into(),
            namespace: namespace.into(),
            name: name.into(),
            generic_arity,
            generic_arguments: Vec::new(),
            array_rank: 0,
        }
    }

    /// Simple name of the assembly that defines this type.
    pub fn assembly_name(&self) -> &str {
        &self.assembly
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    pub fn generic_arguments(&self) -> &[RuntimeType] {
        &self.generic_arguments
    }

    pub fn array_rank(&self) -> usize {
        self.array_rank
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// `Namespace.Name` of the definition, without generic arguments or array
    /// dimensions.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }

    /// Full name; closed generic types list their arguments with assemblies.
    pub fn full_name(&self) -> String {
        let mut out = self.qualified_name();
        if !self.generic_arguments.is_empty() {
            let args: Vec<String> = self
                .generic_arguments
                .iter()
                .map(|a| format!("[{}, {}]", a.full_name(), a.assembly))
                .collect();
            out = format!("{}[{}]", out, args.join(","));
        }
        out.push_str(&array_suffix(self.array_rank));
        out
    }

    pub fn is_generic_type_definition(&self) -> bool {
        self.generic_arity > 0 && self.generic_arguments.is_empty() && self.array_rank == 0
    }

    pub fn is_constructed_generic_type(&self) -> bool {
        !self.generic_arguments.is_empty()
    }

    /// The open definition of a constructed type (itself otherwise).
    pub fn generic_type_definition(&self) -> RuntimeType {
        RuntimeType {
            generic_arguments: Vec::new(),
            ..self.clone()
        }
    }

    /// An array of `rank` dimensions whose elements are this type.
    pub fn make_array_type(&self, rank: usize) -> Result<RuntimeType, GenericInstantiationError> {
        if rank == 0 || self.is_array() {
            return Err(GenericInstantiationError::InvalidArrayRank {
                type_name: self.full_name(),
                rank,
            });
        }
        Ok(RuntimeType {
            array_rank: rank,
            ..self.clone()
        })
    }

    /// The element type of an array (itself otherwise).
    pub fn element_type(&self) -> RuntimeType {
        RuntimeType {
            array_rank: 0,
            ..self.clone()
        }
    }

    /// Substitute `arguments` into this open generic definition.
    pub fn make_generic_type(
        &self,
        arguments: Vec<RuntimeType>,
    ) -> Result<RuntimeType, GenericInstantiationError> {
        if !self.is_generic_type_definition() {
            return Err(GenericInstantiationError::NotGenericDefinition {
                type_name: self.full_name(),
            });
        }
        if arguments.len() != self.generic_arity {
            return Err(GenericInstantiationError::ArityMismatch {
                type_name: self.full_name(),
                expected: self.generic_arity,
                got: arguments.len(),
            });
        }
        Ok(RuntimeType {
            generic_arguments: arguments,
            ..self.clone()
        })
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Failure to construct a generic or array type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericInstantiationError {
    NotGenericDefinition {
        type_name: String,
    },
    ArityMismatch {
        type_name: String,
        expected: usize,
        got: usize,
    },
    /// Zero dimensions, or an array of arrays.
    InvalidArrayRank {
        type_name: String,
        rank: usize,
    },
}

impl fmt::Display for GenericInstantiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericInstantiationError::NotGenericDefinition { type_name } => {
                write!(f, "{} is not a generic type definition", type_name)
            }
            GenericInstantiationError::ArityMismatch {
                type_name,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} generic argument(s), got {}",
                type_name, expected, got
            ),
            GenericInstantiationError::InvalidArrayRank { type_name, rank } => {
                write!(f, "cannot make a rank {} array of {}", rank, type_name)
            }
        }
    }
}

impl std::error::Error for GenericInstantiationError {}

/// Runtime view of one module, keyed by qualified type name.
#[derive(Debug, Clone, Default)]
pub struct RuntimeModule {
    name: String,
    types: BTreeMap<String, RuntimeType>,
}

impl RuntimeModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: BTreeMap::new(),
        }
    }

    /// Materialize the runtime view of `module`: one type per definition, with the
    /// arity given by its generic parameters.
    pub fn from_metadata(module: &EditableModule) -> Self {
        let mut runtime = Self::new(module.name.clone());
        for def in &module.types {
            runtime.add_type(RuntimeType::definition(
                module.name.clone(),
                def.namespace.clone(),
                def.name.clone(),
                def.generic_parameters.len(),
            ));
        }
        runtime
    }

    pub fn add_type(&mut self, ty: RuntimeType) {
        self.types.insert(ty.qualified_name(), ty);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a type by `Namespace.Name`.
    pub fn get_type(&self, qualified_name: &str) -> Option<&RuntimeType> {
        self.types.get(qualified_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &RuntimeType> {
        self.types.values()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
