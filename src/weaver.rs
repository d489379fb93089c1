//! Attribute-walking pipeline.
//!
//! The weaver visits every custom attribute on every type and method of the
//! module under edit, in declaration order:
//!
//! 1. **Classify.** Walk the attribute type's base-type chain, resolving each step
//!    to its editable definition. The attribute is a weaver attribute when the
//!    chain reaches [`WEAVER_ATTRIBUTE`] within `MaxBaseTypeDepth` steps. Other
//!    attributes are skipped with a debug message.
//! 2. **Load.** Resolve the weaver attribute to its runtime type. A weaver that
//!    cannot be loaded is an error.
//! 3. **Apply.** Decode the constructor arguments. Applying a weaver to a method
//!    with no body in this module is a warning; anything else is recorded as an
//!    application.
//!
//! Processing stops at the first message that stops weaving.

use insider_core::{
    decode_arguments, is_external, DecodedValue, MessageImportance, MessageLog, MessageLogged,
};
use insider_types::{CustomAttribute, MethodDefinition, TypeReference};
use tracing::{debug, info};

use crate::session::WeaveSession;

/// Full name every weaver attribute derives from.
pub const WEAVER_ATTRIBUTE: &str = "Insider.WeaverAttribute";

/// Counts for one weave run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaveSummary {
    pub attributes_seen: usize,
    pub weavers_applied: usize,
    pub stopped: bool,
}

/// Result of walking an attribute type's base chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Classification {
    Weaver,
    NotWeaver,
    /// A step of the chain has no editable definition.
    Unresolved(String),
    TooDeep,
}

/// Declaration an attribute is applied to.
enum Target<'m> {
    Type(String),
    Method(String, &'m MethodDefinition),
}

impl Target<'_> {
    fn name(&self) -> &str {
        match self {
            Target::Type(name) | Target::Method(name, _) => name,
        }
    }
}

pub struct Weaver<'s> {
    session: &'s WeaveSession,
    log: MessageLog,
    summary: WeaveSummary,
}

impl<'s> Weaver<'s> {
    pub fn new(session: &'s WeaveSession) -> Self {
        Self::with_log(session, MessageLog::new(session.weave_settings()))
    }

    /// Use `log`, typically one carrying a listener.
    pub fn with_log(session: &'s WeaveSession, log: MessageLog) -> Self {
        Self {
            session,
            log,
            summary: WeaveSummary::default(),
        }
    }

    /// Walk the module under edit.
    pub fn process(&mut self) -> WeaveSummary {
        let session = self.session;
        let module = session.target();
        info!(module = %module.name, types = module.types.len(), "weaving");

        'types: for definition in &module.types {
            let type_name = definition.full_name();
            for attribute in &definition.custom_attributes {
                if self.visit(attribute, &Target::Type(type_name.clone())) {
                    break 'types;
                }
            }
            for method in &definition.methods {
                let target = Target::Method(format!("{}::{}", type_name, method.name), method);
                for attribute in &method.custom_attributes {
                    if self.visit(attribute, &target) {
                        break 'types;
                    }
                }
            }
        }

        info!(
            module = %module.name,
            seen = self.summary.attributes_seen,
            applied = self.summary.weavers_applied,
            stopped = self.summary.stopped,
            "weaving finished"
        );
        self.summary.clone()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn into_log(self) -> MessageLog {
        self.log
    }

    /// Handle one attribute. Returns true when weaving must stop.
    fn visit(&mut self, attribute: &CustomAttribute, target: &Target<'_>) -> bool {
        self.summary.attributes_seen += 1;
        let attribute_name = attribute.attribute_type.full_name();

        match self.classify(&attribute.attribute_type) {
            Classification::Weaver => {}
            Classification::NotWeaver => {
                return self.emit(
                    MessageImportance::Debug,
                    format!("Skipping {} on {}: not a weaver", attribute_name, target.name()),
                    target,
                    &attribute_name,
                );
            }
            Classification::Unresolved(step) => {
                return self.emit(
                    MessageImportance::Debug,
                    format!(
                        "Skipping {} on {}: {} could not be resolved",
                        attribute_name,
                        target.name(),
                        step
                    ),
                    target,
                    &attribute_name,
                );
            }
            Classification::TooDeep => {
                return self.emit(
                    MessageImportance::Warning,
                    format!(
                        "Skipping {} on {}: base type chain deeper than {}",
                        attribute_name,
                        target.name(),
                        self.session.weave_settings().max_base_type_depth
                    ),
                    target,
                    &attribute_name,
                );
            }
        }

        let session = self.session;
        let Some(runtime) = session.context().resolve_to_runtime_type(&attribute.attribute_type) else {
            return self.emit(
                MessageImportance::Error,
                format!(
                    "Weaver {} applied to {} could not be loaded",
                    attribute.attribute_type,
                    target.name()
                ),
                target,
                &attribute_name,
            );
        };
        let weaver = runtime.full_name();
        let arguments = decode_arguments(attribute);

        if let Target::Method(name, method) = target {
            if is_external(method) {
                return self.emit(
                    MessageImportance::Warning,
                    format!("Cannot apply {} to {}: method has no body", weaver, name),
                    target,
                    &weaver,
                );
            }
        }

        self.summary.weavers_applied += 1;
        self.emit(
            MessageImportance::Info,
            format!(
                "Applied {} to {}({})",
                weaver,
                target.name(),
                join_arguments(&arguments)
            ),
            target,
            &weaver,
        )
    }

    fn classify(&self, attribute_type: &TypeReference) -> Classification {
        let context = self.session.context();
        let max_depth = self.session.weave_settings().max_base_type_depth;

        let mut current = attribute_type.clone();
        for _ in 0..max_depth {
            let Some(definition) = context.resolve_to_editable_definition(&current) else {
                return Classification::Unresolved(current.to_string());
            };
            let Some(base) = definition.base_type.clone() else {
                return Classification::NotWeaver;
            };
            if base.qualified_name() == WEAVER_ATTRIBUTE {
                return Classification::Weaver;
            }
            current = base;
        }
        debug!(attribute = %attribute_type, max_depth, "base type walk exceeded depth");
        Classification::TooDeep
    }

    fn emit(
        &mut self,
        importance: MessageImportance,
        message: String,
        target: &Target<'_>,
        weaver: &str,
    ) -> bool {
        let stopped = self.log.log(
            MessageLogged::new(importance, message)
                .with_target(target.name())
                .with_weaver(weaver),
        );
        if stopped {
            self.summary.stopped = true;
        }
        stopped
    }
}

fn join_arguments(arguments: &[DecodedValue]) -> String {
    arguments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
