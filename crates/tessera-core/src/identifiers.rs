//! Opaque entity identifiers
//!
//! Roles, policies, and relations are keyed by opaque UUIDs. Cross-entity
//! references hold these ids, never live pointers, so deleting one entity
//! can leave dangling references in another; callers of the stores are
//! expected to tolerate that (a missing role grants nothing).

use crate::{Result, TesseraError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TesseraError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s).map(Self).map_err(|_| {
                    TesseraError::invalid_detail(format!(
                        concat!("malformed ", $label, " id {:?}"),
                        s
                    ))
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a stored role
    RoleId,
    "role"
);

entity_id!(
    /// Identifier of a stored policy
    PolicyId,
    "policy"
);

entity_id!(
    /// Identifier of a stored relation edge
    RelationId,
    "relation"
);
