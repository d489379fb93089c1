//! Insider
//!
//! A post-compilation weaver. Insider opens a target module image together with
//! the images it references, finds every custom attribute that derives from
//! `Insider.WeaverAttribute`, resolves it through the tiered resolution chain and
//! reports what it found through a message log.
//!
//! - [`loader`]: JSON module images and the directory-backed assembly resolver
//! - [`session`]: one weave session, from opening the images to saving the target
//! - [`weaver`]: the attribute-walking pipeline
//!
//! The building blocks live in the workspace crates: [`insider_types`] for the
//! metadata model, [`insider_resolver`] for resolution and [`insider_core`] for
//! argument decoding, settings and messages.

pub mod loader;
pub mod session;
pub mod weaver;

pub use loader::{read_module, write_module, DirectoryAssemblyResolver};
pub use session::WeaveSession;
pub use weaver::{WeaveSummary, Weaver, WEAVER_ATTRIBUTE};
