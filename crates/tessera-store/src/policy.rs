//! Policy store
//!
//! A policy is an immutable binding: principal `type:id` holds every
//! permission of a role over resource `type:id`. The two addresses arrive
//! as strings, are split before storage, and are re-joined on the way out;
//! there is no update operation; a binding changes only by delete and
//! re-create.

use crate::RoleStore;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tessera_core::{
    join_address, Address, Metadata, MetadataValidatorRef, PolicyId, Result, RoleId, TesseraError,
};
use tessera_registry::NamespaceRegistry;
use tracing::debug;

/// Schema name handed to the metadata validator for policy metadata.
pub const POLICY_METADATA_SCHEMA: &str = "policy";

/// A stored policy binding.
///
/// The principal and resource are stored split; [`Policy::principal_address`]
/// and [`Policy::resource_address`] re-join them into the public grammar,
/// the exact inverse of the split performed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Opaque id
    pub id: PolicyId,
    /// The granted role; may dangle after role deletion
    pub role_id: RoleId,
    /// Principal namespace
    pub principal_type: String,
    /// Principal id within its namespace
    pub principal_id: String,
    /// Resource namespace
    pub resource_type: String,
    /// Resource id within its namespace
    pub resource_id: String,
    /// Free-form metadata
    pub metadata: Metadata,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; policies are immutable
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// The principal in public address form, `namespace:id`.
    pub fn principal_address(&self) -> String {
        join_address(&self.principal_type, &self.principal_id)
    }

    /// The resource in public address form, `namespace:id`.
    pub fn resource_address(&self) -> String {
        join_address(&self.resource_type, &self.resource_id)
    }
}

/// Input for policy creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPolicy {
    /// The role whose permissions are granted
    pub role_id: RoleId,
    /// Principal address, `namespace:id`
    pub principal: String,
    /// Resource address, `namespace:id`
    pub resource: String,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// Listing filter; all fields conjoin.
#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    /// Restrict to policies granting this role
    pub role_id: Option<RoleId>,
    /// Restrict to this principal address
    pub principal: Option<String>,
    /// Restrict to this resource address
    pub resource: Option<String>,
}

#[derive(Default)]
struct PolicyStoreState {
    policies: HashMap<PolicyId, Policy>,
    by_principal: HashMap<(String, String), HashSet<PolicyId>>,
    by_resource: HashMap<(String, String), HashSet<PolicyId>>,
}

/// In-memory policy store keyed by opaque id, with secondary indexes on
/// principal and resource for listing.
pub struct PolicyStore {
    registry: Arc<NamespaceRegistry>,
    roles: Arc<RoleStore>,
    metadata_validator: Option<MetadataValidatorRef>,
    state: RwLock<PolicyStoreState>,
}

impl PolicyStore {
    /// Create a store validating against `registry` and `roles`.
    pub fn new(registry: Arc<NamespaceRegistry>, roles: Arc<RoleStore>) -> Self {
        Self {
            registry,
            roles,
            metadata_validator: None,
            state: RwLock::new(PolicyStoreState::default()),
        }
    }

    /// Attach a metadata validator capability.
    pub fn with_metadata_validator(mut self, validator: MetadataValidatorRef) -> Self {
        self.metadata_validator = Some(validator);
        self
    }

    /// Create a policy.
    ///
    /// Both addresses are split up front; a malformed address is rejected
    /// before any other side effect, so no partial policy is ever written.
    /// Principal and resource namespaces that were never declared through
    /// schema bootstrap are lazily registered; namespaces used purely as
    /// resource types need not carry permissions.
    pub async fn create(&self, policy: NewPolicy) -> Result<Policy> {
        let principal = Address::parse(&policy.principal)?;
        let resource = Address::parse(&policy.resource)?;

        self.roles
            .get(policy.role_id)
            .map_err(|_| TesseraError::not_found(format!("role {}", policy.role_id)))?;

        self.registry.ensure_namespace(principal.namespace())?;
        self.registry.ensure_namespace(resource.namespace())?;

        if let Some(validator) = &self.metadata_validator {
            validator
                .validate(&policy.metadata, POLICY_METADATA_SCHEMA)
                .await?;
        }

        let now = Utc::now();
        let (principal_type, principal_id) = principal.into_parts();
        let (resource_type, resource_id) = resource.into_parts();
        let stored = Policy {
            id: PolicyId::new(),
            role_id: policy.role_id,
            principal_type,
            principal_id,
            resource_type,
            resource_id,
            metadata: policy.metadata,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write();
        state
            .by_principal
            .entry((stored.principal_type.clone(), stored.principal_id.clone()))
            .or_default()
            .insert(stored.id);
        state
            .by_resource
            .entry((stored.resource_type.clone(), stored.resource_id.clone()))
            .or_default()
            .insert(stored.id);
        state.policies.insert(stored.id, stored.clone());
        debug!(
            policy = %stored.id,
            role = %stored.role_id,
            principal = %stored.principal_address(),
            resource = %stored.resource_address(),
            "created policy"
        );
        Ok(stored)
    }

    /// Fetch a policy by id.
    pub fn get(&self, id: PolicyId) -> Result<Policy> {
        self.state
            .read()
            .policies
            .get(&id)
            .cloned()
            .ok_or_else(|| TesseraError::not_found(format!("policy {id}")))
    }

    /// Delete a policy by id.
    pub fn delete(&self, id: PolicyId) -> Result<()> {
        let mut state = self.state.write();
        let policy = state
            .policies
            .remove(&id)
            .ok_or_else(|| TesseraError::not_found(format!("policy {id}")))?;
        if let Some(ids) = state
            .by_principal
            .get_mut(&(policy.principal_type.clone(), policy.principal_id.clone()))
        {
            ids.remove(&id);
        }
        if let Some(ids) = state
            .by_resource
            .get_mut(&(policy.resource_type.clone(), policy.resource_id.clone()))
        {
            ids.remove(&id);
        }
        debug!(policy = %id, "deleted policy");
        Ok(())
    }

    /// List policies matching the filter.
    ///
    /// Principal/resource filters are served from the secondary indexes;
    /// malformed filter addresses fail the call rather than matching
    /// nothing silently.
    pub fn list(&self, filter: &PolicyFilter) -> Result<Vec<Policy>> {
        let state = self.state.read();

        let candidates: Vec<PolicyId> = match (&filter.principal, &filter.resource) {
            (Some(principal), Some(resource)) => {
                let p = Self::index_lookup(&state.by_principal, principal)?;
                let r = Self::index_lookup(&state.by_resource, resource)?;
                p.intersection(&r).copied().collect()
            }
            (Some(principal), None) => Self::index_lookup(&state.by_principal, principal)?
                .into_iter()
                .collect(),
            (None, Some(resource)) => Self::index_lookup(&state.by_resource, resource)?
                .into_iter()
                .collect(),
            (None, None) => state.policies.keys().copied().collect(),
        };

        let mut policies: Vec<Policy> = candidates
            .into_iter()
            .filter_map(|id| state.policies.get(&id))
            .filter(|policy| filter.role_id.map_or(true, |role| policy.role_id == role))
            .cloned()
            .collect();
        policies.sort_by_key(|policy| policy.created_at);
        Ok(policies)
    }

    fn index_lookup(
        index: &HashMap<(String, String), HashSet<PolicyId>>,
        address: &str,
    ) -> Result<HashSet<PolicyId>> {
        let parsed = Address::parse(address)?;
        let (namespace, id) = parsed.into_parts();
        Ok(index.get(&(namespace, id)).cloned().unwrap_or_default())
    }
}
