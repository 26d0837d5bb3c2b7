//! The namespace/permission registry and its additive merge

use crate::{Namespace, Permission, PermissionDefinition};
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tessera_core::{
    decode_key, validate_namespace, PermissionName, Result, TesseraError, RESERVED_NAMESPACE,
};
use tracing::debug;
use uuid::Uuid;

/// Filter for bulk permission lookup.
///
/// An empty slug list matches every permission.
#[derive(Debug, Clone, Default)]
pub struct PermissionFilter {
    /// Internal slugs to select; see [`Permission::slug`]
    pub slugs: Vec<String>,
}

#[derive(Default)]
struct RegistryState {
    namespaces: IndexMap<String, Namespace>,
    // Keyed by (namespace, name); insertion order drives listing order.
    permissions: IndexMap<(String, String), Permission>,
}

/// The set of declared namespaces and the permissions under them.
///
/// Shared by `Arc` handle; interior state sits behind one `RwLock` so a
/// schema merge is a single critical section. Concurrent `append_schema`
/// calls serialize on the write lock and each performs a pure upsert, so
/// interleavings can only widen the declared set: membership is never
/// removed, and only the description of an identical `(namespace, name)`
/// key is last-writer-wins.
#[derive(Default)]
pub struct NamespaceRegistry {
    state: RwLock<RegistryState>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of permission declarations into the registry.
    ///
    /// Additive semantics: permissions not mentioned are untouched;
    /// mentioned ones are created if absent, or have their description
    /// updated if present. Nothing is ever deleted.
    ///
    /// The whole batch is validated before any state changes:
    /// - names must match the restricted class;
    /// - the reserved default namespace is rejected;
    /// - two declarations of the same `(namespace, name)` within one call
    ///   must agree on the description, otherwise the call is a conflict.
    ///
    /// Returns the stored records for the batch, in declaration order.
    pub fn append_schema(&self, definitions: &[PermissionDefinition]) -> Result<Vec<Permission>> {
        let mut batch: Vec<(String, PermissionName, String)> = Vec::new();
        let mut seen: HashMap<(String, String), String> = HashMap::new();

        for def in definitions {
            validate_namespace(&def.namespace)?;
            if def.namespace == RESERVED_NAMESPACE {
                return Err(TesseraError::invalid_detail(format!(
                    "namespace {RESERVED_NAMESPACE:?} is reserved"
                )));
            }
            let name = PermissionName::new(def.name.as_str())?;
            let pair = (def.namespace.clone(), name.as_str().to_owned());
            match seen.get(&pair) {
                Some(description) if *description != def.description => {
                    return Err(TesseraError::conflict(format!(
                        "conflicting declarations of {}:{} in one batch",
                        def.namespace, def.name
                    )));
                }
                Some(_) => continue,
                None => {
                    seen.insert(pair, def.description.clone());
                    batch.push((def.namespace.clone(), name, def.description.clone()));
                }
            }
        }

        let mut state = self.state.write();
        let mut merged = Vec::with_capacity(batch.len());
        for (namespace, name, description) in batch {
            state
                .namespaces
                .entry(namespace.clone())
                .or_insert_with(|| Namespace::new(namespace.clone()));

            let key = (namespace.clone(), name.as_str().to_owned());
            let permission = match state.permissions.entry(key) {
                indexmap::map::Entry::Occupied(entry) => {
                    let existing = entry.into_mut();
                    if existing.description != description {
                        existing.description = description;
                        existing.updated_at = Utc::now();
                    }
                    existing
                }
                indexmap::map::Entry::Vacant(entry) => {
                    let now = Utc::now();
                    entry.insert(Permission {
                        id: Uuid::new_v4(),
                        name,
                        namespace_id: namespace,
                        description,
                        created_at: now,
                        updated_at: now,
                    })
                }
            };
            merged.push(permission.clone());
        }
        debug!(count = merged.len(), "merged schema declarations");
        Ok(merged)
    }

    /// Register a namespace that carries no permissions, if absent.
    ///
    /// Used by the stores for principal/resource types that are valid
    /// addresses but were never declared through schema bootstrap.
    pub fn ensure_namespace(&self, namespace: &str) -> Result<Namespace> {
        validate_namespace(namespace)?;
        if let Some(existing) = self.state.read().namespaces.get(namespace) {
            return Ok(existing.clone());
        }
        let mut state = self.state.write();
        let entry = state
            .namespaces
            .entry(namespace.to_owned())
            .or_insert_with(|| {
                debug!(namespace, "lazily registered namespace");
                Namespace::new(namespace)
            });
        Ok(entry.clone())
    }

    /// Look up a declared namespace.
    pub fn get_namespace(&self, namespace: &str) -> Result<Namespace> {
        self.state
            .read()
            .namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(|| TesseraError::unknown_namespace(namespace))
    }

    /// Whether the namespace has been declared.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.state.read().namespaces.contains_key(namespace)
    }

    /// All declared namespaces, in declaration order.
    pub fn list_namespaces(&self) -> Vec<Namespace> {
        self.state.read().namespaces.values().cloned().collect()
    }

    /// Look up a permission by `(namespace, name)`.
    pub fn get_permission(&self, namespace: &str, name: &PermissionName) -> Result<Permission> {
        self.state
            .read()
            .permissions
            .get(&(namespace.to_owned(), name.as_str().to_owned()))
            .cloned()
            .ok_or_else(|| {
                TesseraError::unknown_permission(format!("{namespace}:{}", name.as_str()))
            })
    }

    /// Look up a permission by its public key form, `namespace:name`.
    pub fn get_permission_by_key(&self, key: &str) -> Result<Permission> {
        let (namespace, name) = decode_key(key)?;
        self.get_permission(&namespace, &name)
    }

    /// Bulk permission lookup by slug; an empty filter lists everything.
    pub fn list_permissions(&self, filter: &PermissionFilter) -> Vec<Permission> {
        let state = self.state.read();
        if filter.slugs.is_empty() {
            return state.permissions.values().cloned().collect();
        }
        let wanted: HashSet<&str> = filter.slugs.iter().map(String::as_str).collect();
        state
            .permissions
            .values()
            .filter(|p| wanted.contains(p.slug().as_str()))
            .cloned()
            .collect()
    }
}
