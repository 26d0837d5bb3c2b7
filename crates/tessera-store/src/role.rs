//! Role store
//!
//! A role is a named, ordered bundle of permission keys, unique per
//! `(org, name)`. Tenant-scoped roles belong to one organization; platform
//! roles are visible to every tenant. The platform case is a distinct
//! variant rather than a sentinel organization id.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tessera_core::{Metadata, MetadataValidatorRef, Result, RoleId, TesseraError};
use tessera_registry::NamespaceRegistry;
use tracing::debug;
use uuid::Uuid;

/// Schema name handed to the metadata validator for role metadata.
pub const ROLE_METADATA_SCHEMA: &str = "role";

/// Tenancy scope of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrgScope {
    /// Global role, visible to every tenant
    Platform,
    /// Role owned by one organization
    Tenant(Uuid),
}

impl fmt::Display for OrgScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Tenant(org_id) => write!(f, "{org_id}"),
        }
    }
}

impl FromStr for OrgScope {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "platform" {
            return Ok(Self::Platform);
        }
        Uuid::parse_str(s)
            .map(Self::Tenant)
            .map_err(|_| TesseraError::invalid_detail(format!("malformed org scope {s:?}")))
    }
}

impl TryFrom<String> for OrgScope {
    type Error = TesseraError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<OrgScope> for String {
    fn from(scope: OrgScope) -> Self {
        scope.to_string()
    }
}

/// Whether a role currently grants its permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleState {
    /// Active
    #[default]
    Enabled,
    /// Retained but granting nothing
    Disabled,
}

/// A stored role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Opaque id
    pub id: RoleId,
    /// Unique within the org scope
    pub name: String,
    /// Display title
    pub title: String,
    /// Tenancy scope
    pub org: OrgScope,
    /// Advisory resource-kind tags constraining where the role attaches
    pub scopes: Vec<String>,
    /// Permission keys (`namespace:name`), in declaration order
    pub permissions: Vec<String>,
    /// Free-form metadata
    pub metadata: Metadata,
    /// Enabled/disabled state
    pub state: RoleState,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

/// Input for role creation and upsert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRole {
    /// Unique within the org scope
    pub name: String,
    /// Display title; defaults to the name when empty
    #[serde(default)]
    pub title: String,
    /// Tenancy scope
    pub org: OrgScope,
    /// Advisory resource-kind tags
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Permission keys (`namespace:name`)
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Initial state
    #[serde(default)]
    pub state: RoleState,
}

impl Default for OrgScope {
    fn default() -> Self {
        Self::Platform
    }
}

/// Partial replace of an existing role, addressed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    /// Which role to update
    pub id: RoleId,
    /// New name; `None` keeps the current one
    #[serde(default)]
    pub name: Option<String>,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New advisory tags
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    /// Replacement permission keys; required and non-empty
    pub permissions: Vec<String>,
    /// New metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// New state
    #[serde(default)]
    pub state: Option<RoleState>,
}

/// Listing filter.
#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    /// Restrict to one org scope. A tenant filter also matches platform
    /// roles, which are visible to every tenant; `Some(Platform)` matches
    /// platform roles only.
    pub org: Option<OrgScope>,
    /// Keep roles sharing at least one of these advisory tags
    pub scopes: Vec<String>,
}

#[derive(Default)]
struct RoleStoreState {
    roles: HashMap<RoleId, Role>,
    by_org_name: HashMap<(OrgScope, String), RoleId>,
}

/// In-memory role store keyed by id and by `(org, name)`.
pub struct RoleStore {
    registry: Arc<NamespaceRegistry>,
    metadata_validator: Option<MetadataValidatorRef>,
    state: RwLock<RoleStoreState>,
}

impl RoleStore {
    /// Create a store that resolves permission keys against `registry`.
    pub fn new(registry: Arc<NamespaceRegistry>) -> Self {
        Self {
            registry,
            metadata_validator: None,
            state: RwLock::new(RoleStoreState::default()),
        }
    }

    /// Attach a metadata validator capability.
    pub fn with_metadata_validator(mut self, validator: MetadataValidatorRef) -> Self {
        self.metadata_validator = Some(validator);
        self
    }

    /// Create a role; rejects `Conflict` when `(org, name)` already exists.
    pub async fn create(&self, role: NewRole) -> Result<Role> {
        self.validate(&role.name, &role.permissions, &role.metadata)
            .await?;
        let mut state = self.state.write();
        let index_key = (role.org, role.name.clone());
        if state.by_org_name.contains_key(&index_key) {
            return Err(TesseraError::conflict(format!(
                "role {:?} already exists in scope {}",
                role.name, role.org
            )));
        }
        Ok(Self::insert_new(&mut state, role))
    }

    /// Create or replace the role named `(org, name)`.
    ///
    /// Replacement keeps the original id and creation time; everything
    /// else is taken from the input.
    pub async fn upsert(&self, role: NewRole) -> Result<Role> {
        self.validate(&role.name, &role.permissions, &role.metadata)
            .await?;
        let mut state = self.state.write();
        let index_key = (role.org, role.name.clone());
        match state.by_org_name.get(&index_key).copied() {
            Some(id) => {
                let existing = state
                    .roles
                    .get_mut(&id)
                    .ok_or_else(|| TesseraError::storage(format!("role index out of sync: {id}")))?;
                existing.title = title_or_name(role.title, &role.name);
                existing.scopes = role.scopes;
                existing.permissions = role.permissions;
                existing.metadata = role.metadata;
                existing.state = role.state;
                existing.updated_at = Utc::now();
                debug!(role = %existing.id, "replaced role by upsert");
                Ok(existing.clone())
            }
            None => Ok(Self::insert_new(&mut state, role)),
        }
    }

    /// Partial replace by id.
    ///
    /// Requires a non-empty permission list; a rename that collides with
    /// another role in the same org scope is a conflict.
    pub async fn update(&self, update: RoleUpdate) -> Result<Role> {
        if update.permissions.is_empty() {
            return Err(TesseraError::invalid_detail(
                "role update requires a non-empty permission list",
            ));
        }
        if let Some(name) = &update.name {
            if name.is_empty() {
                return Err(TesseraError::invalid_detail("empty role name"));
            }
        }
        self.validate_permissions(&update.permissions)?;
        if let Some(metadata) = &update.metadata {
            self.validate_metadata(metadata).await?;
        }

        let mut state = self.state.write();
        let current = state
            .roles
            .get(&update.id)
            .cloned()
            .ok_or_else(|| TesseraError::not_found(format!("role {}", update.id)))?;

        let new_name = update.name.unwrap_or_else(|| current.name.clone());
        if new_name != current.name {
            let collision_key = (current.org, new_name.clone());
            if let Some(other) = state.by_org_name.get(&collision_key) {
                if *other != current.id {
                    return Err(TesseraError::conflict(format!(
                        "role {new_name:?} already exists in scope {}",
                        current.org
                    )));
                }
            }
            state.by_org_name.remove(&(current.org, current.name.clone()));
            state.by_org_name.insert(collision_key, current.id);
        }

        let role = state
            .roles
            .get_mut(&update.id)
            .ok_or_else(|| TesseraError::storage(format!("role index out of sync: {}", update.id)))?;
        role.name = new_name;
        if let Some(title) = update.title {
            role.title = title;
        }
        if let Some(scopes) = update.scopes {
            role.scopes = scopes;
        }
        role.permissions = update.permissions;
        if let Some(metadata) = update.metadata {
            role.metadata = metadata;
        }
        if let Some(role_state) = update.state {
            role.state = role_state;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    /// Delete a role by id.
    ///
    /// Never cascades: policies referencing the role keep their dangling
    /// reference, and the resolver treats the missing role as granting
    /// nothing.
    pub fn delete(&self, id: RoleId) -> Result<()> {
        let mut state = self.state.write();
        let role = state
            .roles
            .remove(&id)
            .ok_or_else(|| TesseraError::not_found(format!("role {id}")))?;
        state.by_org_name.remove(&(role.org, role.name));
        debug!(role = %id, "deleted role; referencing policies are left dangling");
        Ok(())
    }

    /// Fetch a role by id.
    pub fn get(&self, id: RoleId) -> Result<Role> {
        self.state
            .read()
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| TesseraError::not_found(format!("role {id}")))
    }

    /// List roles matching the filter, name-ordered.
    pub fn list(&self, filter: &RoleFilter) -> Vec<Role> {
        let state = self.state.read();
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| match filter.org {
                None => true,
                Some(OrgScope::Platform) => role.org == OrgScope::Platform,
                Some(tenant) => role.org == tenant || role.org == OrgScope::Platform,
            })
            .filter(|role| {
                filter.scopes.is_empty()
                    || role.scopes.iter().any(|s| filter.scopes.contains(s))
            })
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    fn insert_new(state: &mut RoleStoreState, role: NewRole) -> Role {
        let now = Utc::now();
        let stored = Role {
            id: RoleId::new(),
            title: title_or_name(role.title, &role.name),
            name: role.name,
            org: role.org,
            scopes: role.scopes,
            permissions: role.permissions,
            metadata: role.metadata,
            state: role.state,
            created_at: now,
            updated_at: now,
        };
        state
            .by_org_name
            .insert((stored.org, stored.name.clone()), stored.id);
        state.roles.insert(stored.id, stored.clone());
        debug!(role = %stored.id, name = %stored.name, org = %stored.org, "created role");
        stored
    }

    async fn validate(&self, name: &str, permissions: &[String], metadata: &Metadata) -> Result<()> {
        if name.is_empty() {
            return Err(TesseraError::invalid_detail("empty role name"));
        }
        self.validate_permissions(permissions)?;
        self.validate_metadata(metadata).await
    }

    fn validate_permissions(&self, permissions: &[String]) -> Result<()> {
        for key in permissions {
            self.registry.get_permission_by_key(key).map_err(|err| {
                TesseraError::invalid_detail(format!("permission key {key:?}: {err}"))
            })?;
        }
        Ok(())
    }

    async fn validate_metadata(&self, metadata: &Metadata) -> Result<()> {
        if let Some(validator) = &self.metadata_validator {
            validator.validate(metadata, ROLE_METADATA_SCHEMA).await?;
        }
        Ok(())
    }
}

fn title_or_name(title: String, name: &str) -> String {
    if title.is_empty() {
        name.to_owned()
    } else {
        title
    }
}
