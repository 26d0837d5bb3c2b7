//! Unified error system for Tessera
//!
//! A single error type covers the whole workspace. Validation failures
//! (`MalformedAddress`, `InvalidDetail`, `UnknownPermission`,
//! `UnknownNamespace`) are always raised before any storage or resolver
//! side effect. Resolver and storage failures that carry no recognized
//! domain meaning collapse into `Internal` so that internal detail never
//! leaks across the boundary; `Unauthenticated` is the one resolver signal
//! that must pass through distinctly.

use serde::{Deserialize, Serialize};

/// Unified error type for all Tessera operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TesseraError {
    /// A caller-supplied `namespace:id` string does not parse
    #[error("malformed address: {message}")]
    MalformedAddress {
        /// What was wrong with the address
        message: String,
    },

    /// A structurally invalid field (empty required string, disallowed character)
    #[error("invalid detail: {message}")]
    InvalidDetail {
        /// Which field was invalid and why
        message: String,
    },

    /// Reference to a namespace that was never declared
    #[error("unknown namespace: {message}")]
    UnknownNamespace {
        /// The undeclared namespace
        message: String,
    },

    /// Reference to a permission that was never declared
    #[error("unknown permission: {message}")]
    UnknownPermission {
        /// The undeclared permission
        message: String,
    },

    /// Uniqueness violation or conflicting declaration
    #[error("conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },

    /// An existing entity was looked up and is absent
    #[error("not found: {message}")]
    NotFound {
        /// What was missing
        message: String,
    },

    /// The resolver could not establish the caller's identity
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        /// Resolver-supplied detail
        message: String,
    },

    /// Storage operation failed
    #[error("storage error: {message}")]
    Storage {
        /// Storage-layer detail
        message: String,
    },

    /// Opaque internal error; detail is logged, never surfaced
    #[error("internal error: {message}")]
    Internal {
        /// Generic description safe to surface
        message: String,
    },
}

impl TesseraError {
    /// Create a malformed address error
    pub fn malformed_address(message: impl Into<String>) -> Self {
        Self::MalformedAddress {
            message: message.into(),
        }
    }

    /// Create an invalid detail error
    pub fn invalid_detail(message: impl Into<String>) -> Self {
        Self::InvalidDetail {
            message: message.into(),
        }
    }

    /// Create an unknown namespace error
    pub fn unknown_namespace(message: impl Into<String>) -> Self {
        Self::UnknownNamespace {
            message: message.into(),
        }
    }

    /// Create an unknown permission error
    pub fn unknown_permission(message: impl Into<String>) -> Self {
        Self::UnknownPermission {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an unauthenticated error
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is a local validation failure, raised before any
    /// storage or resolver side effect.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedAddress { .. }
                | Self::InvalidDetail { .. }
                | Self::UnknownNamespace { .. }
                | Self::UnknownPermission { .. }
        )
    }
}

/// Standard Result type for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;
