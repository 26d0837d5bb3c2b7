//! Mock metadata validators

use async_trait::async_trait;
use std::collections::HashSet;
use tessera_core::{Metadata, MetadataEffects, Result, TesseraError};

/// Accepts any metadata against any schema.
pub struct NoopMetadataValidator;

#[async_trait]
impl MetadataEffects for NoopMetadataValidator {
    async fn validate(&self, _metadata: &Metadata, _schema: &str) -> Result<()> {
        Ok(())
    }
}

/// Rejects metadata keys outside a declared set.
pub struct ClosedSchemaValidator {
    allowed: HashSet<String>,
}

impl ClosedSchemaValidator {
    /// Allow exactly the given keys.
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl MetadataEffects for ClosedSchemaValidator {
    async fn validate(&self, metadata: &Metadata, schema: &str) -> Result<()> {
        for key in metadata.keys() {
            if !self.allowed.contains(key) {
                return Err(TesseraError::invalid_detail(format!(
                    "metadata key {key:?} not allowed by schema {schema:?}"
                )));
            }
        }
        Ok(())
    }
}
