//! The authorization protocol service

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_core::{
    Address, PermissionName, ResolverRef, Result, TesseraError, ADDRESS_DELIMITER,
};
use tessera_registry::NamespaceRegistry;
use tracing::{debug, warn};

/// One item of a batched check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    /// Object address, `namespace:id`
    pub object: String,
    /// Permission key (`namespace:name`) or bare name in the object's namespace
    pub permission: String,
}

/// One slot of a batched check response, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Echo of the request object
    pub object: String,
    /// Echo of the request permission
    pub permission: String,
    /// The decision; a failed slot is a denial, never an aborted batch
    pub allowed: bool,
}

/// Check / BatchCheck over a registry and an external resolver.
pub struct AuthzService {
    registry: Arc<NamespaceRegistry>,
    resolver: ResolverRef,
}

impl AuthzService {
    /// Create a service delegating decisions to `resolver`.
    pub fn new(registry: Arc<NamespaceRegistry>, resolver: ResolverRef) -> Self {
        Self { registry, resolver }
    }

    /// Evaluate one authorization decision.
    ///
    /// The object address and permission reference are validated against
    /// the registry before the resolver is consulted; a validation failure
    /// never reaches the resolver. The resolver's `Unauthenticated` signal
    /// passes through distinctly; every other resolver failure surfaces as
    /// an opaque internal error.
    pub async fn check(&self, object: &str, permission: &str) -> Result<bool> {
        let (object, permission) = self.validate(object, permission)?;
        self.delegate(&object, &permission).await
    }

    /// Evaluate a batch of independent authorization decisions.
    ///
    /// Items are fanned out concurrently; results are written into a slot
    /// vector by input index, so the n-th output always corresponds to the
    /// n-th input regardless of completion order. A per-item failure
    /// (malformed address, unknown permission, resolver error) denies only
    /// that slot. Only `Unauthenticated` aborts the whole call: it concerns
    /// the caller, not an item.
    pub async fn batch_check(&self, items: Vec<CheckItem>) -> Result<Vec<CheckResult>> {
        let mut slots: Vec<Option<CheckResult>> = vec![None; items.len()];

        let mut pending: FuturesUnordered<_> = items
            .iter()
            .enumerate()
            .map(|(index, item)| async move { (index, self.check_item(item).await) })
            .collect();

        while let Some((index, outcome)) = pending.next().await {
            let allowed = match outcome {
                Ok(allowed) => allowed,
                Err(err @ TesseraError::Unauthenticated { .. }) => return Err(err),
                Err(err) => {
                    debug!(
                        object = %items[index].object,
                        permission = %items[index].permission,
                        error = %err,
                        "batch item failed; denying its slot"
                    );
                    false
                }
            };
            slots[index] = Some(CheckResult {
                object: items[index].object.clone(),
                permission: items[index].permission.clone(),
                allowed,
            });
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| TesseraError::internal(format!("batch slot {index} unfilled")))
            })
            .collect()
    }

    async fn check_item(&self, item: &CheckItem) -> Result<bool> {
        let (object, permission) = self.validate(&item.object, &item.permission)?;
        self.delegate(&object, &permission).await
    }

    fn validate(&self, object: &str, permission: &str) -> Result<(Address, PermissionName)> {
        let object = Address::parse(object)?;
        let resolved = if permission.contains(ADDRESS_DELIMITER) {
            self.registry.get_permission_by_key(permission)?
        } else {
            let name = PermissionName::new(permission)
                .map_err(|_| TesseraError::unknown_permission(permission))?;
            self.registry.get_permission(object.namespace(), &name)?
        };
        Ok((object, resolved.name))
    }

    async fn delegate(&self, object: &Address, permission: &PermissionName) -> Result<bool> {
        match self.resolver.check_authz(object, permission).await {
            Ok(allowed) => Ok(allowed),
            Err(err @ TesseraError::Unauthenticated { .. }) => Err(err),
            Err(err) => {
                warn!(object = %object, permission = %permission, error = %err, "resolver failure");
                Err(TesseraError::internal("authorization resolver failure"))
            }
        }
    }
}
