//! Tessera Core - Addressing, Codecs, and Capability Interfaces
//!
//! This crate provides the foundational types shared by every Tessera crate:
//! the `namespace:id` address grammar, the permission slug/key codecs, the
//! unified error type, opaque entity identifiers, and the pure capability
//! interfaces (resolver, metadata validation) that the rest of the system
//! consumes but never implements here.
//!
//! # Layering
//!
//! - Pure types and string transforms only; no storage, no I/O.
//! - Capability traits are signatures without implementations. Production
//!   handlers live with the host; mocks live in `tessera-testkit`.

#![forbid(unsafe_code)]

/// Entity addressing grammar (`namespace:id`)
pub mod address;

/// Capability interfaces consumed by the model
pub mod effects;

/// Unified error handling
pub mod error;

/// Opaque entity identifiers
pub mod identifiers;

/// Free-form metadata carried by roles and policies
pub mod metadata;

/// Permission naming and the slug/key encodings
pub mod permission;

pub use address::{
    join_address, split_address, validate_namespace, Address, ADDRESS_DELIMITER,
    NAMESPACE_SEPARATOR,
};
pub use effects::{MetadataEffects, MetadataValidatorRef, ResolverEffects, ResolverRef};
pub use error::{Result, TesseraError};
pub use identifiers::{PolicyId, RelationId, RoleId};
pub use metadata::Metadata;
pub use permission::{
    decode_key, decode_slug, encode_key, encode_slug, PermissionName, RESERVED_NAMESPACE,
    SLUG_DELIMITER,
};
