//! Weaving messages.
//!
//! Every diagnostic the weaver produces is a [`MessageLogged`] with one of four
//! importances. Whether a message stops weaving is decided here, once, from the
//! session's [`WeaveSettings`]:
//!
//! | Importance | Prefix | Stops weaving |
//! |------------|--------|---------------|
//! | Info | `[+]` | never |
//! | Debug | `[*]` | never |
//! | Warning | `[-]` | with `TreatWarningsAsErrors` |
//! | Error | `[!]` | always |
//!
//! A [`MessageLog`] keeps every message, mirrors it to `tracing`, and forwards it
//! to an optional listener. Debug messages only reach the listener when
//! `EmitDebugMessages` is set.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::settings::WeaveSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageImportance {
    Info,
    Debug,
    Warning,
    Error,
}

impl MessageImportance {
    /// Console prefix for this importance.
    pub fn prefix(self) -> &'static str {
        match self {
            MessageImportance::Info => "[+]",
            MessageImportance::Debug => "[*]",
            MessageImportance::Warning => "[-]",
            MessageImportance::Error => "[!]",
        }
    }
}

impl fmt::Display for MessageImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageImportance::Info => "info",
            MessageImportance::Debug => "debug",
            MessageImportance::Warning => "warning",
            MessageImportance::Error => "error",
        };
        f.write_str(name)
    }
}

/// One message logged while weaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLogged {
    pub message: String,
    pub importance: MessageImportance,
    /// Set by [`MessageLog::log`] from the session policy.
    pub stopped_weaving: bool,
    /// Member or declaration being processed, if any.
    pub target: Option<String>,
    /// Full name of the weaver attribute that produced the message, if any.
    pub weaver: Option<String>,
}

impl MessageLogged {
    pub fn new(importance: MessageImportance, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            importance,
            stopped_weaving: false,
            target: None,
            weaver: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_weaver(mut self, weaver: impl Into<String>) -> Self {
        self.weaver = Some(weaver.into());
        self
    }
}

impl fmt::Display for MessageLogged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.importance.prefix(), self.message)
    }
}

pub type MessageListener = Box<dyn FnMut(&MessageLogged) + Send>;

/// Records messages for one weave run.
pub struct MessageLog {
    treat_warnings_as_errors: bool,
    emit_debug_messages: bool,
    listener: Option<MessageListener>,
    messages: Vec<MessageLogged>,
}

impl MessageLog {
    pub fn new(settings: &WeaveSettings) -> Self {
        Self {
            treat_warnings_as_errors: settings.treat_warnings_as_errors,
            emit_debug_messages: settings.emit_debug_messages,
            listener: None,
            messages: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: impl FnMut(&MessageLogged) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Whether a message of `importance` stops weaving under this log's policy.
    pub fn stops_weaving(&self, importance: MessageImportance) -> bool {
        match importance {
            MessageImportance::Error => true,
            MessageImportance::Warning => self.treat_warnings_as_errors,
            MessageImportance::Info | MessageImportance::Debug => false,
        }
    }

    /// Record `message`, returning whether it stopped weaving.
    pub fn log(&mut self, mut message: MessageLogged) -> bool {
        message.stopped_weaving = self.stops_weaving(message.importance);
        mirror(&message);

        let forward = message.importance != MessageImportance::Debug || self.emit_debug_messages;
        if forward {
            if let Some(listener) = self.listener.as_mut() {
                listener(&message);
            }
        }

        let stopped = message.stopped_weaving;
        self.messages.push(message);
        stopped
    }

    pub fn info(&mut self, message: impl Into<String>) -> bool {
        self.log(MessageLogged::new(MessageImportance::Info, message))
    }

    pub fn debug(&mut self, message: impl Into<String>) -> bool {
        self.log(MessageLogged::new(MessageImportance::Debug, message))
    }

    pub fn warning(&mut self, message: impl Into<String>) -> bool {
        self.log(MessageLogged::new(MessageImportance::Warning, message))
    }

    pub fn error(&mut self, message: impl Into<String>) -> bool {
        self.log(MessageLogged::new(MessageImportance::Error, message))
    }

    pub fn messages(&self) -> &[MessageLogged] {
        &self.messages
    }

    pub fn count(&self, importance: MessageImportance) -> usize {
        self.messages
            .iter()
            .filter(|m| m.importance == importance)
            .count()
    }

    /// True once any recorded message has stopped weaving.
    pub fn encountered_error(&self) -> bool {
        self.messages.iter().any(|m| m.stopped_weaving)
    }

    pub fn into_messages(self) -> Vec<MessageLogged> {
        self.messages
    }
}

impl fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLog")
            .field("treat_warnings_as_errors", &self.treat_warnings_as_errors)
            .field("emit_debug_messages", &self.emit_debug_messages)
            .field("has_listener", &self.listener.is_some())
            .field("messages", &self.messages.len())
            .finish()
    }
}

fn mirror(message: &MessageLogged) {
    let target = message.target.as_deref().unwrap_or("");
    let weaver = message.weaver.as_deref().unwrap_or("");
    match message.importance {
        MessageImportance::Info => info!(target_member = %target, weaver = %weaver, "{}", message.message),
        MessageImportance::Debug => debug!(target_member = %target, weaver = %weaver, "{}", message.message),
        MessageImportance::Warning => warn!(target_member = %target, weaver = %weaver, "{}", message.message),
        MessageImportance::Error => error!(target_member = %target, weaver = %weaver, "{}", message.message),
    }
}
