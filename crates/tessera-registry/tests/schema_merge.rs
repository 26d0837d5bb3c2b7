//! Additive-merge properties of the namespace registry
//!
//! ## Properties verified
//!
//! - Concurrent `append_schema` calls with disjoint sets A and B leave the
//!   registry containing A ∪ B regardless of interleaving
//! - Concurrent re-declaration of overlapping sets never shrinks membership
//! - Merge order does not affect final membership

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use tessera_registry::{NamespaceRegistry, PermissionDefinition, PermissionFilter};

fn definitions_for(caller: usize, count: usize) -> Vec<PermissionDefinition> {
    (0..count)
        .map(|i| PermissionDefinition::new(format!("svc{caller}/resource"), format!("perm{i}"), ""))
        .collect()
}

#[test]
fn concurrent_disjoint_merges_union() {
    let registry = Arc::new(NamespaceRegistry::new());
    let callers = 8;
    let per_caller = 16;

    let handles: Vec<_> = (0..callers)
        .map(|caller| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .append_schema(&definitions_for(caller, per_caller))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = registry.list_permissions(&PermissionFilter::default());
    assert_eq!(all.len(), callers * per_caller);
}

#[test]
fn concurrent_overlapping_merges_never_shrink() {
    let registry = Arc::new(NamespaceRegistry::new());
    registry
        .append_schema(&[PermissionDefinition::new("org", "read", "seed")])
        .unwrap();

    // Every thread re-declares the shared permission with its own
    // description and adds one of its own.
    let handles: Vec<_> = (0..8)
        .map(|caller| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .append_schema(&[
                        PermissionDefinition::new("org", "read", format!("caller {caller}")),
                        PermissionDefinition::new("org", format!("extra{caller}"), ""),
                    ])
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = registry.list_permissions(&PermissionFilter::default());
    // 1 shared + 8 extras; the shared one kept a single row with some
    // caller's description.
    assert_eq!(all.len(), 9);
    let shared = registry.get_permission_by_key("org:read").unwrap();
    assert!(shared.description.starts_with("caller ") || shared.description == "seed");
}

proptest! {
    /// Property: merge order does not affect membership
    #[test]
    fn prop_merge_order_irrelevant(
        names_a in proptest::collection::btree_set("[a-z][a-z0-9]{0,6}", 1..8),
        names_b in proptest::collection::btree_set("[a-z][a-z0-9]{0,6}", 1..8),
    ) {
        let forward = NamespaceRegistry::new();
        let reverse = NamespaceRegistry::new();

        let batch_a: Vec<_> = names_a
            .iter()
            .map(|n| PermissionDefinition::new("app/project", n.as_str(), ""))
            .collect();
        let batch_b: Vec<_> = names_b
            .iter()
            .map(|n| PermissionDefinition::new("app/project", n.as_str(), ""))
            .collect();

        forward.append_schema(&batch_a).unwrap();
        forward.append_schema(&batch_b).unwrap();
        reverse.append_schema(&batch_b).unwrap();
        reverse.append_schema(&batch_a).unwrap();

        let mut forward_slugs: Vec<_> = forward
            .list_permissions(&PermissionFilter::default())
            .iter()
            .map(tessera_registry::Permission::slug)
            .collect();
        let mut reverse_slugs: Vec<_> = reverse
            .list_permissions(&PermissionFilter::default())
            .iter()
            .map(tessera_registry::Permission::slug)
            .collect();
        forward_slugs.sort();
        reverse_slugs.sort();
        prop_assert_eq!(forward_slugs, reverse_slugs);
    }
}
