//! Registry record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{encode_key, encode_slug, PermissionName};
use uuid::Uuid;

/// A declared category of resource that can carry permissions.
///
/// The id is the canonical namespace string (`"app/project"`); the name is
/// a display label and defaults to the id. Namespaces are created
/// implicitly the first time a permission is declared under them (or
/// lazily when first used as a resource type) and are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Canonical namespace string
    pub id: String,
    /// Display label
    pub name: String,
    /// When the namespace was first declared
    pub created_at: DateTime<Utc>,
    /// When the namespace record last changed
    pub updated_at: DateTime<Utc>,
}

impl Namespace {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let now = Utc::now();
        Self {
            name: id.clone(),
            id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named action scoped to a namespace.
///
/// Identity is the `(namespace_id, name)` pair; the slug and key encodings
/// are derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Opaque record id
    pub id: Uuid,
    /// The permission name within its namespace
    pub name: PermissionName,
    /// The owning namespace
    pub namespace_id: String,
    /// Human-readable description; last writer wins on re-declaration
    pub description: String,
    /// When the permission was first declared
    pub created_at: DateTime<Utc>,
    /// When the description last changed
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// The internal filterable identifier, `namespace_name`.
    pub fn slug(&self) -> String {
        encode_slug(&self.namespace_id, &self.name)
    }

    /// The public client-facing identifier, `namespace:name`.
    pub fn key(&self) -> String {
        encode_key(&self.namespace_id, &self.name)
    }
}

/// One permission declaration submitted to schema bootstrap.
///
/// Raw strings on purpose: validation happens inside `append_schema`,
/// before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Namespace to declare the permission under
    pub namespace: String,
    /// Permission name
    pub name: String,
    /// Description; empty is allowed
    #[serde(default)]
    pub description: String,
}

impl PermissionDefinition {
    /// Convenience constructor
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}
