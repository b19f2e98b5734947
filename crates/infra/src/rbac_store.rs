//! Tenant-partitioned store of RBAC objects.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use maxperm_auth::rbac::{
    ClusterRole, ClusterRoleBinding, RbacObjects, RbacSource, Role, RoleBinding,
};
use maxperm_core::{AccessError, AccessResult, TenantId};

/// In-memory RBAC objects for every tenant.
///
/// Writes replace objects with the same name (and namespace); reads go through
/// a [`TenantRbacSource`] view scoped to one tenant.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    inner: RwLock<HashMap<TenantId, RbacObjects>>,
}

impl InMemoryRbacStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// View of one tenant's objects.
    pub fn scope(self: &Arc<Self>, tenant: TenantId) -> TenantRbacSource {
        TenantRbacSource {
            store: Arc::clone(self),
            tenant,
        }
    }

    pub fn replace_tenant(&self, tenant: TenantId, objects: RbacObjects) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(tenant, objects);
        }
    }

    pub fn upsert_role(&self, tenant: &TenantId, role: Role) {
        self.with_tenant(tenant, |objects| {
            objects
                .roles
                .retain(|r| !(r.namespace == role.namespace && r.name == role.name));
            objects.roles.push(role);
        });
    }

    pub fn upsert_cluster_role(&self, tenant: &TenantId, role: ClusterRole) {
        self.with_tenant(tenant, |objects| {
            objects.cluster_roles.retain(|r| r.name != role.name);
            objects.cluster_roles.push(role);
        });
    }

    pub fn upsert_role_binding(&self, tenant: &TenantId, binding: RoleBinding) {
        self.with_tenant(tenant, |objects| {
            objects
                .role_bindings
                .retain(|b| !(b.namespace == binding.namespace && b.name == binding.name));
            objects.role_bindings.push(binding);
        });
    }

    pub fn upsert_cluster_role_binding(&self, tenant: &TenantId, binding: ClusterRoleBinding) {
        self.with_tenant(tenant, |objects| {
            objects.cluster_role_bindings.retain(|b| b.name != binding.name);
            objects.cluster_role_bindings.push(binding);
        });
    }

    pub fn clear_tenant(&self, tenant: &TenantId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(tenant);
        }
    }

    fn with_tenant(&self, tenant: &TenantId, f: impl FnOnce(&mut RbacObjects)) {
        if let Ok(mut map) = self.inner.write() {
            f(map.entry(tenant.clone()).or_default());
        }
    }

    fn read<T>(
        &self,
        tenant: &TenantId,
        f: impl FnOnce(&RbacObjects) -> AccessResult<T>,
    ) -> AccessResult<T>
    where
        T: Default,
    {
        let map = self
            .inner
            .read()
            .map_err(|_| AccessError::index_lookup("rbac store lock poisoned"))?;

        match map.get(tenant) {
            Some(objects) => f(objects),
            None => Ok(T::default()),
        }
    }
}

/// Read-only view of one tenant in an [`InMemoryRbacStore`].
#[derive(Debug, Clone)]
pub struct TenantRbacSource {
    store: Arc<InMemoryRbacStore>,
    tenant: TenantId,
}

impl TenantRbacSource {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }
}

impl RbacSource for TenantRbacSource {
    fn role(&self, namespace: &str, name: &str) -> AccessResult<Option<Role>> {
        self.store.read(&self.tenant, |o| o.role(namespace, name))
    }

    fn cluster_role(&self, name: &str) -> AccessResult<Option<ClusterRole>> {
        self.store.read(&self.tenant, |o| o.cluster_role(name))
    }

    fn role_bindings(&self, namespace: &str) -> AccessResult<Vec<RoleBinding>> {
        self.store.read(&self.tenant, |o| o.role_bindings(namespace))
    }

    fn cluster_role_bindings(&self) -> AccessResult<Vec<ClusterRoleBinding>> {
        self.store.read(&self.tenant, |o| o.cluster_role_bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxperm_auth::rbac::{PolicyRule, Subject};

    fn tenant(name: &str) -> TenantId {
        TenantId::parse(name).unwrap()
    }

    #[test]
    fn scopes_do_not_see_each_other() {
        let store = Arc::new(InMemoryRbacStore::new());
        store.upsert_cluster_role(
            &tenant("root:a"),
            ClusterRole {
                name: "view".to_string(),
                rules: vec![PolicyRule::new(["get"], ["*"], ["*"])],
            },
        );

        assert!(store.scope(tenant("root:a")).cluster_role("view").unwrap().is_some());
        assert!(store.scope(tenant("root:b")).cluster_role("view").unwrap().is_none());
        assert!(store.scope(tenant("root:b")).cluster_role_bindings().unwrap().is_empty());
    }

    #[test]
    fn upserts_replace_by_name() {
        let store = Arc::new(InMemoryRbacStore::new());
        let a = tenant("root:a");
        for cluster_role in ["view", "edit"] {
            store.upsert_cluster_role_binding(
                &a,
                ClusterRoleBinding {
                    name: "b".to_string(),
                    subjects: vec![Subject::group("g")],
                    cluster_role: cluster_role.to_string(),
                },
            );
        }

        let bindings = store.scope(a).cluster_role_bindings().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].cluster_role, "edit");
    }

    #[test]
    fn writes_are_visible_through_existing_views() {
        let store = Arc::new(InMemoryRbacStore::new());
        let a = tenant("root:a");
        let view = store.scope(a.clone());
        assert!(view.role("ns", "r").unwrap().is_none());

        store.upsert_role(
            &a,
            Role {
                name: "r".to_string(),
                namespace: "ns".to_string(),
                rules: Vec::new(),
            },
        );

        assert!(view.role("ns", "r").unwrap().is_some());
        assert!(view.role("other", "r").unwrap().is_none());
    }
}
