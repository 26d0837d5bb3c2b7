//! Relation store
//!
//! Relations are the primitive graph edges beneath the role/policy
//! abstraction: `(object, relation, subject)` tuples such as "user X is a
//! member of group Y" or "group Y is owner of project Z". A subject may
//! carry a sub-relation, making the edge a userset: "members of group Y"
//! rather than "group Y itself". This store only reads and writes edges;
//! walking them is the external resolver's job.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tessera_core::{Address, RelationId, Result, TesseraError};
use tessera_registry::NamespaceRegistry;
use tracing::debug;

/// A subject of a relation edge: an address plus an optional sub-relation.
///
/// With a sub-relation set, the subject is the set of entities holding
/// that relation on the subject address (`group:eng#member`), not the
/// addressed entity itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// The subject entity
    pub address: Address,
    /// Optional relation on the subject whose holders are the real subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_relation: Option<String>,
}

/// A stored relation edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Opaque id
    pub id: RelationId,
    /// The object the edge points at
    pub object: Address,
    /// The subject holding the relation
    pub subject: Subject,
    /// Relation name, restricted to the permission-name character class
    pub relation: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; relations are immutable
    pub updated_at: DateTime<Utc>,
}

/// Input for relation creation; addresses in string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelation {
    /// Object address, `namespace:id`
    pub object: String,
    /// Subject address, `namespace:id`
    pub subject: String,
    /// Optional sub-relation on the subject
    #[serde(default)]
    pub sub_relation: Option<String>,
    /// Relation name
    pub relation: String,
}

/// Listing filter; all fields conjoin.
#[derive(Debug, Clone, Default)]
pub struct RelationFilter {
    /// Restrict to edges on this object address
    pub object: Option<String>,
    /// Restrict to edges held by this subject address
    pub subject: Option<String>,
    /// Restrict to this relation name
    pub relation: Option<String>,
}

#[derive(Default)]
struct RelationStoreState {
    relations: HashMap<RelationId, Relation>,
    by_object: HashMap<Address, HashSet<RelationId>>,
    by_subject: HashMap<Address, HashSet<RelationId>>,
}

/// In-memory relation store keyed by opaque id, with secondary indexes on
/// object and subject for listing.
pub struct RelationStore {
    registry: Arc<NamespaceRegistry>,
    state: RwLock<RelationStoreState>,
}

impl RelationStore {
    /// Create a store registering namespaces against `registry`.
    pub fn new(registry: Arc<NamespaceRegistry>) -> Self {
        Self {
            registry,
            state: RwLock::new(RelationStoreState::default()),
        }
    }

    /// Create a relation edge.
    ///
    /// Addresses are parsed before any side effect; unknown namespaces are
    /// lazily registered. Creating an edge identical to an existing one is
    /// idempotent and returns the stored edge.
    pub fn create(&self, relation: NewRelation) -> Result<Relation> {
        let object = Address::parse(&relation.object)?;
        let subject_address = Address::parse(&relation.subject)?;
        validate_relation_name(&relation.relation)?;
        if let Some(sub_relation) = &relation.sub_relation {
            validate_relation_name(sub_relation)?;
        }

        self.registry.ensure_namespace(object.namespace())?;
        self.registry.ensure_namespace(subject_address.namespace())?;

        let subject = Subject {
            address: subject_address,
            sub_relation: relation.sub_relation,
        };

        let mut state = self.state.write();
        if let Some(ids) = state.by_object.get(&object) {
            for id in ids {
                if let Some(existing) = state.relations.get(id) {
                    if existing.subject == subject && existing.relation == relation.relation {
                        return Ok(existing.clone());
                    }
                }
            }
        }

        let now = Utc::now();
        let stored = Relation {
            id: RelationId::new(),
            object,
            subject,
            relation: relation.relation,
            created_at: now,
            updated_at: now,
        };
        state
            .by_object
            .entry(stored.object.clone())
            .or_default()
            .insert(stored.id);
        state
            .by_subject
            .entry(stored.subject.address.clone())
            .or_default()
            .insert(stored.id);
        state.relations.insert(stored.id, stored.clone());
        debug!(
            relation = %stored.id,
            object = %stored.object,
            subject = %stored.subject.address,
            name = %stored.relation,
            "created relation"
        );
        Ok(stored)
    }

    /// Fetch an edge by id.
    pub fn get(&self, id: RelationId) -> Result<Relation> {
        self.state
            .read()
            .relations
            .get(&id)
            .cloned()
            .ok_or_else(|| TesseraError::not_found(format!("relation {id}")))
    }

    /// Delete an edge by id.
    pub fn delete(&self, id: RelationId) -> Result<()> {
        let mut state = self.state.write();
        let relation = state
            .relations
            .remove(&id)
            .ok_or_else(|| TesseraError::not_found(format!("relation {id}")))?;
        if let Some(ids) = state.by_object.get_mut(&relation.object) {
            ids.remove(&id);
        }
        if let Some(ids) = state.by_subject.get_mut(&relation.subject.address) {
            ids.remove(&id);
        }
        debug!(relation = %id, "deleted relation");
        Ok(())
    }

    /// List edges matching the filter, served from the indexes.
    pub fn list(&self, filter: &RelationFilter) -> Result<Vec<Relation>> {
        let state = self.state.read();

        let candidates: Vec<RelationId> = match (&filter.object, &filter.subject) {
            (Some(object), Some(subject)) => {
                let o = Self::index_lookup(&state.by_object, object)?;
                let s = Self::index_lookup(&state.by_subject, subject)?;
                o.intersection(&s).copied().collect()
            }
            (Some(object), None) => Self::index_lookup(&state.by_object, object)?
                .into_iter()
                .collect(),
            (None, Some(subject)) => Self::index_lookup(&state.by_subject, subject)?
                .into_iter()
                .collect(),
            (None, None) => state.relations.keys().copied().collect(),
        };

        let mut relations: Vec<Relation> = candidates
            .into_iter()
            .filter_map(|id| state.relations.get(&id))
            .filter(|edge| {
                filter
                    .relation
                    .as_deref()
                    .map_or(true, |name| edge.relation == name)
            })
            .cloned()
            .collect();
        relations.sort_by_key(|edge| edge.created_at);
        Ok(relations)
    }

    fn index_lookup(
        index: &HashMap<Address, HashSet<RelationId>>,
        address: &str,
    ) -> Result<HashSet<RelationId>> {
        let parsed = Address::parse(address)?;
        Ok(index.get(&parsed).cloned().unwrap_or_default())
    }
}

fn validate_relation_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TesseraError::invalid_detail("empty relation name"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TesseraError::invalid_detail(format!(
            "relation name {name:?} must be alphanumeric"
        )));
    }
    Ok(())
}
