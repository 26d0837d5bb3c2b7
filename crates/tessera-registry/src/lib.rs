//! Tessera Registry - Namespaces and Permissions
//!
//! The registry is the shared, additively-mutated schema of the
//! authorization model: which namespaces exist and which permissions are
//! declared under them. Mutation happens only through [`NamespaceRegistry::append_schema`]
//! (schema bootstrap) and [`NamespaceRegistry::ensure_namespace`] (lazy
//! registration of resource-only namespaces); neither ever deletes.
//!
//! All readers take an `Arc` handle to one registry value; there is no
//! ambient global state.

#![forbid(unsafe_code)]

mod registry;
mod types;

pub use registry::{NamespaceRegistry, PermissionFilter};
pub use types::{Namespace, Permission, PermissionDefinition};
