//! Shared fixtures

use std::sync::Arc;
use tessera_registry::{NamespaceRegistry, PermissionDefinition};
use tessera_store::{NewRole, OrgScope};

/// The permission set most tests work with.
pub fn sample_definitions() -> Vec<PermissionDefinition> {
    vec![
        PermissionDefinition::new("app/project", "get", "read a project"),
        PermissionDefinition::new("app/project", "update", "modify a project"),
        PermissionDefinition::new("app/project", "delete", "remove a project"),
        PermissionDefinition::new("app/org", "read", "read an organization"),
    ]
}

/// A registry pre-loaded with [`sample_definitions`].
pub fn bootstrap_registry() -> Arc<NamespaceRegistry> {
    let registry = NamespaceRegistry::new();
    registry
        .append_schema(&sample_definitions())
        .unwrap_or_else(|err| panic!("sample definitions must merge: {err}"));
    Arc::new(registry)
}

/// A platform-scoped admin role over the sample project permissions.
pub fn project_admin_role() -> NewRole {
    NewRole {
        name: "admin".into(),
        org: OrgScope::Platform,
        scopes: vec!["project".into()],
        permissions: vec![
            "app/project:get".into(),
            "app/project:update".into(),
            "app/project:delete".into(),
        ],
        ..NewRole::default()
    }
}
