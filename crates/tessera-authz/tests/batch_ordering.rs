//! BatchCheck ordering under concurrent completion
//!
//! Items are delayed so that completion order inverts request order; the
//! response must still line up slot-for-slot with the request.

use std::sync::Arc;
use std::time::Duration;
use tessera_authz::{AuthzService, CheckItem};
use tessera_core::TesseraError;
use tessera_testkit::{
    bootstrap_registry, AllowAllResolver, DelayedResolver, DenyAllResolver,
    UnauthenticatedResolver,
};

fn item(object: &str) -> CheckItem {
    CheckItem {
        object: object.into(),
        permission: "app/project:update".into(),
    }
}

#[tokio::test]
async fn results_follow_request_order_not_completion_order() {
    let resolver = DelayedResolver::new(Arc::new(AllowAllResolver))
        .with_delay("app/project:slow", Duration::from_millis(80))
        .with_delay("app/project:mid", Duration::from_millis(40));
    let service = AuthzService::new(bootstrap_registry(), Arc::new(resolver));

    // Completion order: fast, mid, slow. Request order: slow, fast, mid.
    let results = service
        .batch_check(vec![
            item("app/project:slow"),
            item("app/project:fast"),
            item("app/project:mid"),
        ])
        .await
        .unwrap();

    let objects: Vec<&str> = results.iter().map(|r| r.object.as_str()).collect();
    assert_eq!(
        objects,
        vec!["app/project:slow", "app/project:fast", "app/project:mid"]
    );
    assert!(results.iter().all(|r| r.allowed));
}

#[tokio::test]
async fn failed_slots_keep_their_position() {
    let resolver = DelayedResolver::new(Arc::new(AllowAllResolver))
        .with_delay("app/project:slow", Duration::from_millis(60));
    let service = AuthzService::new(bootstrap_registry(), Arc::new(resolver));

    let results = service
        .batch_check(vec![
            item("app/project:slow"),
            CheckItem {
                object: "broken".into(),
                permission: "app/project:update".into(),
            },
            item("app/project:fast"),
        ])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].allowed);
    assert!(!results[1].allowed);
    assert_eq!(results[1].object, "broken");
    assert!(results[2].allowed);
}

#[tokio::test]
async fn denial_is_a_result_not_an_error() {
    let service = AuthzService::new(bootstrap_registry(), Arc::new(DenyAllResolver));
    let results = service
        .batch_check(vec![item("app/project:abc"), item("app/project:def")])
        .await
        .unwrap();
    assert!(results.iter().all(|r| !r.allowed));
}

#[tokio::test]
async fn unauthenticated_resolver_aborts_the_batch() {
    let service = AuthzService::new(bootstrap_registry(), Arc::new(UnauthenticatedResolver));
    assert!(matches!(
        service.batch_check(vec![item("app/project:abc")]).await,
        Err(TesseraError::Unauthenticated { .. })
    ));
}

#[tokio::test]
async fn large_batch_preserves_order() {
    let service = AuthzService::new(bootstrap_registry(), Arc::new(AllowAllResolver));
    let items: Vec<CheckItem> = (0..64).map(|i| item(&format!("app/project:p{i}"))).collect();
    let expected: Vec<String> = items.iter().map(|i| i.object.clone()).collect();

    let results = service.batch_check(items).await.unwrap();
    let objects: Vec<String> = results.into_iter().map(|r| r.object).collect();
    assert_eq!(objects, expected);
}
