//! Free-form metadata carried by roles and policies
//!
//! Shape enforcement is a consumed capability (`MetadataEffects`), not a
//! concern of this crate.

use std::collections::HashMap;

/// Arbitrary key/value metadata attached to roles and policies.
pub type Metadata = HashMap<String, serde_json::Value>;
