//! Capability interfaces consumed by the model
//!
//! Pure trait signatures only. The graph-resolution engine that actually
//! walks policies and relations, and the metadata-schema validator, are
//! external collaborators: production handlers live with the host process,
//! mocks live in `tessera-testkit`.

use crate::{Address, Metadata, PermissionName, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The external graph-resolution engine.
///
/// Given an addressed object and a registered permission, decides whether
/// the caller holds that permission. Caller identity is ambient to the
/// resolver; when it cannot be established the resolver returns
/// `Unauthenticated`, which the protocol layer passes through distinctly
/// from every other resolver failure.
#[async_trait]
pub trait ResolverEffects: Send + Sync {
    /// Evaluate a single authorization decision.
    async fn check_authz(&self, object: &Address, permission: &PermissionName) -> Result<bool>;
}

/// Type alias for shared resolver references
pub type ResolverRef = Arc<dyn ResolverEffects>;

/// Metadata-schema validation.
///
/// Enforces a caller-declared metadata shape when roles or policies carry
/// metadata.
#[async_trait]
pub trait MetadataEffects: Send + Sync {
    /// Validate `metadata` against the named schema.
    async fn validate(&self, metadata: &Metadata, schema: &str) -> Result<()>;
}

/// Type alias for shared metadata validator references
pub type MetadataValidatorRef = Arc<dyn MetadataEffects>;
