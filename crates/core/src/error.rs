//! Access-layer error model.

use thiserror::Error;

/// Result type used by lookups and authorizers.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failure while computing an access decision.
///
/// Every variant is fail-closed: callers map it to a non-permitting decision.
/// "Not found" outcomes are *not* errors and are modelled as `Option` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The requesting tenant could not be determined from the request context.
    #[error("tenant unresolved: {0}")]
    TenantUnresolved(String),

    /// The request context was cancelled before a lookup completed.
    #[error("request context is done")]
    ContextDone,

    /// A secondary index could not be read.
    #[error("index lookup failed: {0}")]
    IndexLookup(String),

    /// An index returned an object of an unexpected shape.
    #[error("malformed index entry: expected {expected}")]
    MalformedIndexEntry { expected: &'static str },

    /// A role binding references a role that does not exist.
    #[error("{kind} {name:?} not found")]
    RoleNotFound { kind: &'static str, name: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl AccessError {
    pub fn tenant_unresolved(msg: impl Into<String>) -> Self {
        Self::TenantUnresolved(msg.into())
    }

    pub fn index_lookup(msg: impl Into<String>) -> Self {
        Self::IndexLookup(msg.into())
    }

    pub fn malformed(expected: &'static str) -> Self {
        Self::MalformedIndexEntry { expected }
    }

    pub fn role_not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::RoleNotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
