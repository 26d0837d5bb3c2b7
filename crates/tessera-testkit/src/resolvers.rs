//! Stub resolver implementations
//!
//! These stand in for the external graph-resolution engine. `StubResolver`
//! evaluates stored policies and relations directly; the fixed-outcome
//! resolvers drive protocol-level tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{
    encode_key, Address, PermissionName, ResolverEffects, ResolverRef, Result, TesseraError,
};
use tessera_store::{PolicyFilter, PolicyStore, RelationFilter, RelationStore, RoleState, RoleStore};

/// Grants everything.
pub struct AllowAllResolver;

#[async_trait]
impl ResolverEffects for AllowAllResolver {
    async fn check_authz(&self, _object: &Address, _permission: &PermissionName) -> Result<bool> {
        Ok(true)
    }
}

/// Denies everything.
pub struct DenyAllResolver;

#[async_trait]
impl ResolverEffects for DenyAllResolver {
    async fn check_authz(&self, _object: &Address, _permission: &PermissionName) -> Result<bool> {
        Ok(false)
    }
}

/// Fails every check with the resolver's caller-identity signal.
pub struct UnauthenticatedResolver;

#[async_trait]
impl ResolverEffects for UnauthenticatedResolver {
    async fn check_authz(&self, _object: &Address, _permission: &PermissionName) -> Result<bool> {
        Err(TesseraError::unauthenticated("no caller identity"))
    }
}

/// Wraps another resolver, delaying configured objects.
///
/// Lets a test invert completion order inside a batch and observe that
/// response order still follows request order.
pub struct DelayedResolver {
    inner: ResolverRef,
    delays: HashMap<String, Duration>,
}

impl DelayedResolver {
    /// Wrap `inner` with no delays configured.
    pub fn new(inner: ResolverRef) -> Self {
        Self {
            inner,
            delays: HashMap::new(),
        }
    }

    /// Delay every check against `object` (address string form) by `delay`.
    pub fn with_delay(mut self, object: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(object.into(), delay);
        self
    }
}

#[async_trait]
impl ResolverEffects for DelayedResolver {
    async fn check_authz(&self, object: &Address, permission: &PermissionName) -> Result<bool> {
        if let Some(delay) = self.delays.get(&object.to_string()) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.check_authz(object, permission).await
    }
}

/// A deterministic resolver over the in-memory stores.
///
/// Grants a permission on an object when either holds:
///
/// - some policy binds a role to the configured caller over that object,
///   the role still exists and is enabled, and the role's bundle contains
///   the permission key for the object's namespace (a policy whose role
///   was deleted grants nothing);
/// - a direct relation edge on the object names the permission with the
///   caller as subject.
pub struct StubResolver {
    caller: Address,
    roles: Arc<RoleStore>,
    policies: Arc<PolicyStore>,
    relations: Option<Arc<RelationStore>>,
}

impl StubResolver {
    /// Resolve on behalf of `caller` against roles and policies.
    pub fn new(caller: Address, roles: Arc<RoleStore>, policies: Arc<PolicyStore>) -> Self {
        Self {
            caller,
            roles,
            policies,
            relations: None,
        }
    }

    /// Also honor direct relation edges.
    pub fn with_relations(mut self, relations: Arc<RelationStore>) -> Self {
        self.relations = Some(relations);
        self
    }

    fn policy_grants(&self, object: &Address, permission: &PermissionName) -> Result<bool> {
        let bindings = self.policies.list(&PolicyFilter {
            principal: Some(self.caller.to_string()),
            resource: Some(object.to_string()),
            ..PolicyFilter::default()
        })?;
        let wanted = encode_key(object.namespace(), permission);
        for policy in bindings {
            let role = match self.roles.get(policy.role_id) {
                Ok(role) => role,
                // Dangling reference: the role was deleted after the
                // policy was written. Grants nothing.
                Err(_) => continue,
            };
            if role.state == RoleState::Disabled {
                continue;
            }
            if role.permissions.iter().any(|key| *key == wanted) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn relation_grants(&self, object: &Address, permission: &PermissionName) -> Result<bool> {
        let Some(relations) = &self.relations else {
            return Ok(false);
        };
        let edges = relations.list(&RelationFilter {
            object: Some(object.to_string()),
            subject: Some(self.caller.to_string()),
            relation: Some(permission.as_str().to_owned()),
        })?;
        Ok(!edges.is_empty())
    }
}

#[async_trait]
impl ResolverEffects for StubResolver {
    async fn check_authz(&self, object: &Address, permission: &PermissionName) -> Result<bool> {
        if self.policy_grants(object, permission)? {
            return Ok(true);
        }
        self.relation_grants(object, permission)
    }
}
