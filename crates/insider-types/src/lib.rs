//! Shared metadata model for the insider workspace.
//!
//! This crate provides the two parallel views of a module that the rest of the
//! workspace works with:
//!
//! - **Editable metadata**: [`EditableModule`], [`TypeDefinition`],
//!   [`MethodDefinition`] and [`CustomAttribute`] mirror the on-disk structure of a
//!   module and can be mutated and re-serialized.
//! - **Runtime view**: [`RuntimeModule`] and [`RuntimeType`] are the materialized,
//!   introspectable representation used for generic instantiation and identity
//!   comparisons.
//!
//! Both views are connected through [`TypeReference`], the metadata-level pointer
//! to a type that names its namespace, simple name, owning module and declaring
//! scope.

pub mod attribute;
pub mod definition;
pub mod module;
pub mod runtime;
pub mod type_ref;

pub use attribute::{AttributeValue, CustomAttribute, CustomAttributeArgument};
pub use definition::{MethodDefinition, TypeDefinition};
pub use module::{EditableModule, TypeDefinitionHandle};
pub use runtime::{GenericInstantiationError, RuntimeModule, RuntimeType};
pub use type_ref::{qualified_name, TypeNameError, TypeReference};
