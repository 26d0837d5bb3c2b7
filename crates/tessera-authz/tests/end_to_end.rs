//! End-to-end: schema bootstrap → role → policy → check
//!
//! Uses the testkit stub resolver, which honors stored policies and
//! relations the way the external graph engine would.

use std::sync::Arc;
use tessera_authz::AuthzService;
use tessera_core::{Address, Metadata};
use tessera_store::{NewPolicy, NewRelation, PolicyStore, RelationStore, RoleStore};
use tessera_testkit::{bootstrap_registry, project_admin_role, NoopMetadataValidator, StubResolver};

struct World {
    roles: Arc<RoleStore>,
    policies: Arc<PolicyStore>,
    relations: Arc<RelationStore>,
    service: AuthzService,
}

fn world(caller: &str) -> World {
    let registry = bootstrap_registry();
    let roles = Arc::new(
        RoleStore::new(Arc::clone(&registry)).with_metadata_validator(Arc::new(NoopMetadataValidator)),
    );
    let policies = Arc::new(
        PolicyStore::new(Arc::clone(&registry), Arc::clone(&roles))
            .with_metadata_validator(Arc::new(NoopMetadataValidator)),
    );
    let relations = Arc::new(RelationStore::new(Arc::clone(&registry)));
    let resolver = StubResolver::new(
        Address::parse(caller).unwrap(),
        Arc::clone(&roles),
        Arc::clone(&policies),
    )
    .with_relations(Arc::clone(&relations));
    let service = AuthzService::new(registry, Arc::new(resolver));
    World {
        roles,
        policies,
        relations,
        service,
    }
}

#[tokio::test]
async fn policy_grants_role_permissions_over_resource() {
    let w = world("app/user:xyz");
    let admin = w.roles.create(project_admin_role()).await.unwrap();
    w.policies
        .create(NewPolicy {
            role_id: admin.id,
            principal: "app/user:xyz".into(),
            resource: "app/project:abc".into(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

    assert!(w
        .service
        .check("app/project:abc", "app/project:update")
        .await
        .unwrap());
    // Same caller, unbound resource.
    assert!(!w
        .service
        .check("app/project:other", "app/project:update")
        .await
        .unwrap());
}

#[tokio::test]
async fn unbound_caller_is_denied() {
    let w = world("app/user:stranger");
    let admin = w.roles.create(project_admin_role()).await.unwrap();
    w.policies
        .create(NewPolicy {
            role_id: admin.id,
            principal: "app/user:xyz".into(),
            resource: "app/project:abc".into(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

    assert!(!w
        .service
        .check("app/project:abc", "app/project:update")
        .await
        .unwrap());
}

#[tokio::test]
async fn deleting_role_turns_policy_into_no_grant() {
    let w = world("app/user:xyz");
    let admin = w.roles.create(project_admin_role()).await.unwrap();
    w.policies
        .create(NewPolicy {
            role_id: admin.id,
            principal: "app/user:xyz".into(),
            resource: "app/project:abc".into(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();
    assert!(w
        .service
        .check("app/project:abc", "app/project:update")
        .await
        .unwrap());

    w.roles.delete(admin.id).unwrap();

    // Deletion did not error despite the live policy, and the dangling
    // reference now grants nothing rather than erroring.
    assert!(!w
        .service
        .check("app/project:abc", "app/project:update")
        .await
        .unwrap());
}

#[tokio::test]
async fn direct_relation_edge_grants() {
    let w = world("app/user:xyz");
    w.relations
        .create(NewRelation {
            object: "app/project:abc".into(),
            subject: "app/user:xyz".into(),
            sub_relation: None,
            relation: "get".into(),
        })
        .unwrap();

    // Bare permission name, resolved in the object's namespace.
    assert!(w.service.check("app/project:abc", "get").await.unwrap());
    assert!(!w.service.check("app/project:abc", "delete").await.unwrap());
}

#[tokio::test]
async fn batch_mixes_grants_and_denials_in_order() {
    let w = world("app/user:xyz");
    let admin = w.roles.create(project_admin_role()).await.unwrap();
    w.policies
        .create(NewPolicy {
            role_id: admin.id,
            principal: "app/user:xyz".into(),
            resource: "app/project:abc".into(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

    let results = w
        .service
        .batch_check(vec![
            tessera_authz::CheckItem {
                object: "app/project:abc".into(),
                permission: "app/project:update".into(),
            },
            tessera_authz::CheckItem {
                object: "app/project:unbound".into(),
                permission: "app/project:update".into(),
            },
        ])
        .await
        .unwrap();

    assert!(results[0].allowed);
    assert!(!results[1].allowed);
}
