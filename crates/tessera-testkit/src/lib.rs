//! Tessera Testkit - fixtures and mock capability handlers
//!
//! Mock implementations of the capability interfaces live here, never in
//! the production crates. The centerpiece is [`StubResolver`], a
//! deterministic resolver that honors stored policies and relations the
//! way the external graph engine would, which is enough to exercise the
//! whole model end to end without one.

#![forbid(unsafe_code)]

mod fixtures;
mod resolvers;
mod validators;

pub use fixtures::{bootstrap_registry, project_admin_role, sample_definitions};
pub use resolvers::{
    AllowAllResolver, DelayedResolver, DenyAllResolver, StubResolver, UnauthenticatedResolver,
};
pub use validators::{ClosedSchemaValidator, NoopMetadataValidator};
