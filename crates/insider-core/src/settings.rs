//! Settings store.
//!
//! User settings are a string-keyed map of JSON values, filled once before weaving
//! starts and read many times afterwards. Lookups never fail: a missing key and a
//! value of the wrong type both yield the caller's default.
//!
//! The keys the weaver itself understands are collected in [`WeaveSettings`], which
//! is validated once at session start. Edit logic is free to read any other key
//! through [`Settings::get_setting`].
//!
//! # Example
//!
//! ```
//! use insider_core::settings::Settings;
//! use serde_json::json;
//!
//! let mut settings = Settings::new();
//! settings.insert("timeout", json!(45));
//! settings.insert("mode", json!("fast"));
//!
//! assert_eq!(settings.get_setting("timeout", 30), 45);
//! assert_eq!(settings.get_setting("mode", 30), 30);
//! assert_eq!(settings.get_setting("missing", 30), 30);
//! ```

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Treat warnings as errors (bool).
pub const TREAT_WARNINGS_AS_ERRORS: &str = "TreatWarningsAsErrors";
/// Forward debug messages to listeners (bool).
pub const EMIT_DEBUG_MESSAGES: &str = "EmitDebugMessages";
/// Bound on base-type chain walks (u32).
pub const MAX_BASE_TYPE_DEPTH: &str = "MaxBaseTypeDepth";

/// String-keyed settings, read-only once weaving starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from a JSON object. Any other JSON value yields `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                values: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: Settings) {
        self.values.extend(other.values);
    }

    /// Parse a `KEY=VALUE` assignment. VALUE is read as JSON when it parses,
    /// otherwise as a plain string.
    pub fn parse_assignment(assignment: &str) -> Option<(String, Value)> {
        let (key, raw) = assignment.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Some((key.to_string(), value))
    }

    /// The value of `key` as `T`, or `default` when it is absent or not a `T`.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.values.get(key) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or(default),
            None => default,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Settings the weaver itself reads, validated once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaveSettings {
    /// Warnings stop weaving like errors do.
    pub treat_warnings_as_errors: bool,
    /// Debug messages reach message listeners.
    pub emit_debug_messages: bool,
    /// Longest base-type chain walked when classifying attributes.
    pub max_base_type_depth: u32,
}

impl Default for WeaveSettings {
    fn default() -> Self {
        Self {
            treat_warnings_as_errors: false,
            emit_debug_messages: false,
            max_base_type_depth: 32,
        }
    }
}

impl WeaveSettings {
    /// Read the recognised keys from `settings`.
    ///
    /// Values of the wrong type are reported and replaced by their default.
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        let resolved = Self {
            treat_warnings_as_errors: read(
                settings,
                TREAT_WARNINGS_AS_ERRORS,
                defaults.treat_warnings_as_errors,
                "bool",
            ),
            emit_debug_messages: read(
                settings,
                EMIT_DEBUG_MESSAGES,
                defaults.emit_debug_messages,
                "bool",
            ),
            max_base_type_depth: read(
                settings,
                MAX_BASE_TYPE_DEPTH,
                defaults.max_base_type_depth,
                "u32",
            ),
        };

        for key in settings.keys() {
            if !Self::is_recognised(key) {
                debug!(key = %key, "setting not used by the weaver");
            }
        }
        resolved
    }

    pub fn is_recognised(key: &str) -> bool {
        matches!(
            key,
            TREAT_WARNINGS_AS_ERRORS | EMIT_DEBUG_MESSAGES | MAX_BASE_TYPE_DEPTH
        )
    }
}

fn read<T: DeserializeOwned>(settings: &Settings, key: &str, default: T, expected: &str) -> T {
    match settings.get(key) {
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(v) => v,
            Err(_) => {
                warn!(key = %key, expected = %expected, value = %value, "ignoring setting of wrong type");
                default
            }
        },
        None => default,
    }
}
