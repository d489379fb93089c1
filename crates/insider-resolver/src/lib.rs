//! Insider Resolver
//!
//! Cross-module type resolution for the insider weaver.
//!
//! This crate provides:
//! - [`registry`]: the module registry, one runtime/metadata pair per module
//! - [`structural`]: direct resolution of a reference through its declaring scope
//! - [`context`]: the resolution context with its tiered fallback chains
//!
//! # Two views, two chains
//!
//! Every participating module is held twice: as a [`RuntimeModule`] for
//! reflection-style queries and generic instantiation, and as an
//! [`EditableModule`] for structural edits. A [`TypeReference`] read from the
//! module under edit can be mapped to either view:
//!
//! - to a runtime type: module under edit, then the registered module named by the
//!   reference's owning module, then the one named by its declaring scope, closing
//!   generic instantiations over recursively resolved arguments;
//! - to an editable definition: structural resolution, then the registered module
//!   named by the declaring scope.
//!
//! Resolution never fails loudly: a miss is `None`.
//!
//! [`RuntimeModule`]: insider_types::RuntimeModule
//! [`EditableModule`]: insider_types::EditableModule
//! [`TypeReference`]: insider_types::TypeReference

pub mod context;
pub mod error;
pub mod registry;
pub mod structural;

pub use context::ResolutionContext;
pub use error::ResolveError;
pub use registry::{ModuleEntry, ModuleRegistry};
pub use structural::{AssemblyResolver, InMemoryAssemblyResolver, MetadataResolver, ScopeResolver};
