//! Entity addressing grammar
//!
//! Every entity participating in the model is referenced by the string form
//! `namespace:id`. The namespace may be hierarchical (`app/project`); the
//! `':'` delimiter appears exactly once and never inside either component.
//! Parsing is fail-fast: a malformed address is rejected before any other
//! work happens, and `Display` is the exact inverse of `parse`.

use crate::{Result, TesseraError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delimiter between the namespace and id components of an address.
pub const ADDRESS_DELIMITER: char = ':';

/// Separator between segments of a hierarchical namespace.
pub const NAMESPACE_SEPARATOR: char = '/';

/// A parsed `namespace:id` address.
///
/// The only interchange format between the RPC surface and the model.
/// Construction always validates, so a held `Address` is known well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    namespace: String,
    id: String,
}

impl Address {
    /// Build an address from its components, validating both.
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let id = id.into();
        validate_namespace(&namespace)?;
        validate_id(&id)?;
        Ok(Self { namespace, id })
    }

    /// Parse the `namespace:id` string form.
    ///
    /// Fails with `MalformedAddress` when the delimiter is missing or
    /// repeated, or when either side is empty.
    pub fn parse(s: &str) -> Result<Self> {
        let (namespace, id) = s.split_once(ADDRESS_DELIMITER).ok_or_else(|| {
            TesseraError::malformed_address(format!("missing '{ADDRESS_DELIMITER}' in {s:?}"))
        })?;
        if id.contains(ADDRESS_DELIMITER) {
            return Err(TesseraError::malformed_address(format!(
                "more than one '{ADDRESS_DELIMITER}' in {s:?}"
            )));
        }
        Self::new(namespace, id)
    }

    /// The namespace component.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The id component.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Decompose into owned `(namespace, id)` parts.
    pub fn into_parts(self) -> (String, String) {
        (self.namespace, self.id)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ADDRESS_DELIMITER}{}", self.namespace, self.id)
    }
}

impl FromStr for Address {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TesseraError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Split an address string into `(namespace, id)`.
pub fn split_address(s: &str) -> Result<(String, String)> {
    Address::parse(s).map(Address::into_parts)
}

/// Join `(namespace, id)` back into the string form.
///
/// Pure and total; the inverse of [`split_address`] for any valid pair.
pub fn join_address(namespace: &str, id: &str) -> String {
    format!("{namespace}{ADDRESS_DELIMITER}{id}")
}

/// Validate a namespace: one or more `[a-z0-9_-]+` segments joined by `'/'`.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(TesseraError::malformed_address("empty namespace"));
    }
    for segment in namespace.split(NAMESPACE_SEPARATOR) {
        if segment.is_empty() {
            return Err(TesseraError::malformed_address(format!(
                "empty segment in namespace {namespace:?}"
            )));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(TesseraError::malformed_address(format!(
                "disallowed character in namespace {namespace:?}"
            )));
        }
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(TesseraError::malformed_address("empty id"));
    }
    if id.contains(ADDRESS_DELIMITER) {
        return Err(TesseraError::malformed_address(format!(
            "'{ADDRESS_DELIMITER}' inside id {id:?}"
        )));
    }
    Ok(())
}
