//! Permission naming and the two canonical encodings
//!
//! A permission is identified by the pair `(namespace, name)`. Two derived
//! string encodings exist and are mutually invertible with the pair:
//!
//! - **key**: `namespace:name`, the public client-facing identifier. A key
//!   is itself a well-formed address in the permission's namespace, which is
//!   why lookup endpoints can accept it wherever an address is accepted.
//! - **slug**: `namespace_name`, the internal filterable identifier used
//!   for bulk lookups. Decoded from the right: names never contain `'_'`
//!   while namespaces may, so `rsplit_once` is an exact inverse.
//!
//! Permission names are restricted to `[A-Za-z0-9]+`. That restriction is
//! what keeps both codecs injective.

use crate::address::{validate_namespace, Address};
use crate::{Result, TesseraError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The reserved default namespace; permissions cannot be declared under it.
pub const RESERVED_NAMESPACE: &str = "default";

/// Delimiter between the namespace and name components of a slug.
pub const SLUG_DELIMITER: char = '_';

/// A validated permission name (`[A-Za-z0-9]+`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Validate and wrap a permission name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TesseraError::invalid_detail("empty permission name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TesseraError::invalid_detail(format!(
                "permission name {name:?} must be alphanumeric"
            )));
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PermissionName {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PermissionName {
    type Error = TesseraError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<PermissionName> for String {
    fn from(name: PermissionName) -> Self {
        name.0
    }
}

impl AsRef<str> for PermissionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode the public key form, `namespace:name`.
pub fn encode_key(namespace: &str, name: &PermissionName) -> String {
    format!("{namespace}{}{name}", crate::ADDRESS_DELIMITER)
}

/// Decode a public key back into `(namespace, name)`.
pub fn decode_key(key: &str) -> Result<(String, PermissionName)> {
    let address = Address::parse(key)?;
    let (namespace, raw_name) = address.into_parts();
    let name = PermissionName::new(raw_name)?;
    Ok((namespace, name))
}

/// Encode the internal slug form, `namespace_name`.
pub fn encode_slug(namespace: &str, name: &PermissionName) -> String {
    format!("{namespace}{SLUG_DELIMITER}{name}")
}

/// Decode a slug back into `(namespace, name)`.
///
/// Splits on the last `'_'`; valid names contain none, so the split point
/// is unambiguous.
pub fn decode_slug(slug: &str) -> Result<(String, PermissionName)> {
    let (namespace, raw_name) = slug.rsplit_once(SLUG_DELIMITER).ok_or_else(|| {
        TesseraError::invalid_detail(format!("missing '{SLUG_DELIMITER}' in slug {slug:?}"))
    })?;
    validate_namespace(namespace)?;
    let name = PermissionName::new(raw_name)?;
    Ok((namespace.to_owned(), name))
}
