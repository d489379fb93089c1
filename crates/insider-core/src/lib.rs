//! Insider Core
//!
//! Helpers the weaving pipeline and edit logic lean on while walking a module.
//!
//! # Core Modules
//!
//! - [`attributes`]: decode raw custom attribute arguments into plain values
//! - [`settings`]: string-keyed settings store and the typed [`WeaveSettings`]
//! - [`members`]: classify methods by where their body lives
//! - [`messages`]: severity vocabulary and the "stops weaving" policy

pub mod attributes;
pub mod members;
pub mod messages;
pub mod settings;

pub use attributes::{decode_annotation_argument, decode_arguments, DecodedValue};
pub use members::{body_location, is_external, BodyLocation, NO_BODY_RVA};
pub use messages::{MessageImportance, MessageListener, MessageLog, MessageLogged};
pub use settings::{Settings, WeaveSettings};
