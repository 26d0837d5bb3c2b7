//! Tessera Store - Roles, Policies, and Relations
//!
//! The mutable half of the authorization model:
//!
//! - [`RoleStore`]: named, ordered bundles of permission references,
//!   scoped to a tenant or to the platform as a whole.
//! - [`PolicyStore`]: immutable bindings granting a role's permissions
//!   over a resource to a principal.
//! - [`RelationStore`]: primitive graph edges beneath the role/policy
//!   abstraction; read/write access only, traversal belongs to the
//!   external resolver.
//!
//! Stores reference each other by opaque id, never by live pointer, so no
//! cross-entity locking exists; deleting a role leaves dangling references
//! in policies, a documented, tolerated state the resolver must treat as
//! "grants nothing".

#![forbid(unsafe_code)]

mod policy;
mod relation;
mod role;

pub use policy::{NewPolicy, Policy, PolicyFilter, PolicyStore, POLICY_METADATA_SCHEMA};
pub use relation::{NewRelation, Relation, RelationFilter, RelationStore, Subject};
pub use role::{
    NewRole, OrgScope, Role, RoleFilter, RoleState, RoleStore, RoleUpdate, ROLE_METADATA_SCHEMA,
};
