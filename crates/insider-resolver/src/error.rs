//! Reasons structural resolution can fail.
//!
//! These never leave the resolver: the fallback chain in
//! [`ResolutionContext`](crate::ResolutionContext) logs the reason and moves on to
//! the next tier.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The declaring scope could not be located.
    ScopeUnavailable {
        scope: String,
        reason: String,
    },
    /// The scope was found but does not define the type.
    TypeNotFound {
        full_name: String,
        scope: String,
    },
    /// Loading the scope's metadata failed (unreadable or malformed image).
    LoadFailed {
        scope: String,
        message: String,
    },
}

impl ResolveError {
    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::ScopeUnavailable { .. } => "scope_unavailable",
            ResolveError::TypeNotFound { .. } => "type_not_found",
            ResolveError::LoadFailed { .. } => "load_failed",
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::ScopeUnavailable { scope, reason } => {
                write!(f, "scope {} unavailable: {}", scope, reason)
            }
            ResolveError::TypeNotFound { full_name, scope } => {
                write!(f, "type {} not found in {}", full_name, scope)
            }
            ResolveError::LoadFailed { scope, message } => {
                write!(f, "failed to load {}: {}", scope, message)
            }
        }
    }
}

impl std::error::Error for ResolveError {}
