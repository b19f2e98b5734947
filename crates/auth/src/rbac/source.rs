use std::sync::Arc;

use serde::{Deserialize, Serialize};

use maxperm_core::AccessResult;

use super::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

/// Read access to the RBAC objects of one scope.
///
/// Lookups may fail (e.g. an unreadable cache); absence is `Ok(None)`.
pub trait RbacSource: Send + Sync {
    fn role(&self, namespace: &str, name: &str) -> AccessResult<Option<Role>>;

    fn cluster_role(&self, name: &str) -> AccessResult<Option<ClusterRole>>;

    fn role_bindings(&self, namespace: &str) -> AccessResult<Vec<RoleBinding>>;

    fn cluster_role_bindings(&self) -> AccessResult<Vec<ClusterRoleBinding>>;
}

impl<S> RbacSource for Arc<S>
where
    S: RbacSource + ?Sized,
{
    fn role(&self, namespace: &str, name: &str) -> AccessResult<Option<Role>> {
        (**self).role(namespace, name)
    }

    fn cluster_role(&self, name: &str) -> AccessResult<Option<ClusterRole>> {
        (**self).cluster_role(name)
    }

    fn role_bindings(&self, namespace: &str) -> AccessResult<Vec<RoleBinding>> {
        (**self).role_bindings(namespace)
    }

    fn cluster_role_bindings(&self) -> AccessResult<Vec<ClusterRoleBinding>> {
        (**self).cluster_role_bindings()
    }
}

/// A fixed set of RBAC objects for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RbacObjects {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub cluster_roles: Vec<ClusterRole>,
    #[serde(default)]
    pub role_bindings: Vec<RoleBinding>,
    #[serde(default)]
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
}

impl RbacSource for RbacObjects {
    fn role(&self, namespace: &str, name: &str) -> AccessResult<Option<Role>> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.namespace == namespace && r.name == name)
            .cloned())
    }

    fn cluster_role(&self, name: &str) -> AccessResult<Option<ClusterRole>> {
        Ok(self.cluster_roles.iter().find(|r| r.name == name).cloned())
    }

    fn role_bindings(&self, namespace: &str) -> AccessResult<Vec<RoleBinding>> {
        Ok(self
            .role_bindings
            .iter()
            .filter(|b| b.namespace == namespace)
            .cloned()
            .collect())
    }

    fn cluster_role_bindings(&self) -> AccessResult<Vec<ClusterRoleBinding>> {
        Ok(self.cluster_role_bindings.clone())
    }
}

/// Union of a tenant's own RBAC objects and a shared scope.
///
/// Point lookups prefer the tenant scope; cluster role binding lists
/// concatenate both, tenant first. Role bindings are namespaced grants and come
/// from the tenant scope only.
#[derive(Clone)]
pub struct MergedRbacSource {
    tenant: Arc<dyn RbacSource>,
    shared: Arc<dyn RbacSource>,
}

impl MergedRbacSource {
    pub fn new(tenant: Arc<dyn RbacSource>, shared: Arc<dyn RbacSource>) -> Self {
        Self { tenant, shared }
    }
}

impl RbacSource for MergedRbacSource {
    fn role(&self, namespace: &str, name: &str) -> AccessResult<Option<Role>> {
        match self.tenant.role(namespace, name)? {
            Some(role) => Ok(Some(role)),
            None => self.shared.role(namespace, name),
        }
    }

    fn cluster_role(&self, name: &str) -> AccessResult<Option<ClusterRole>> {
        match self.tenant.cluster_role(name)? {
            Some(role) => Ok(Some(role)),
            None => self.shared.cluster_role(name),
        }
    }

    fn role_bindings(&self, namespace: &str) -> AccessResult<Vec<RoleBinding>> {
        self.tenant.role_bindings(namespace)
    }

    fn cluster_role_bindings(&self) -> AccessResult<Vec<ClusterRoleBinding>> {
        let mut bindings = self.tenant.cluster_role_bindings()?;
        bindings.extend(self.shared.cluster_role_bindings()?);
        Ok(bindings)
    }
}

impl core::fmt::Debug for MergedRbacSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MergedRbacSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{PolicyRule, RoleRef, RoleRefKind, Subject};

    fn cluster_role(name: &str, verb: &str) -> ClusterRole {
        ClusterRole {
            name: name.to_string(),
            rules: vec![PolicyRule::new([verb], ["*"], ["*"])],
        }
    }

    fn binding(name: &str, role: &str) -> ClusterRoleBinding {
        ClusterRoleBinding {
            name: name.to_string(),
            subjects: vec![Subject::group("g")],
            cluster_role: role.to_string(),
        }
    }

    #[test]
    fn tenant_scope_shadows_shared_roles() {
        let tenant = RbacObjects {
            cluster_roles: vec![cluster_role("view", "get")],
            ..RbacObjects::default()
        };
        let shared = RbacObjects {
            cluster_roles: vec![cluster_role("view", "list"), cluster_role("admin", "*")],
            ..RbacObjects::default()
        };
        let merged = MergedRbacSource::new(Arc::new(tenant), Arc::new(shared));

        assert_eq!(merged.cluster_role("view").unwrap().unwrap().rules[0].verbs, vec!["get"]);
        assert!(merged.cluster_role("admin").unwrap().is_some());
        assert!(merged.cluster_role("missing").unwrap().is_none());
    }

    #[test]
    fn binding_lists_are_concatenated() {
        let tenant = RbacObjects {
            cluster_role_bindings: vec![binding("local", "view")],
            ..RbacObjects::default()
        };
        let shared = RbacObjects {
            cluster_role_bindings: vec![binding("platform", "admin")],
            ..RbacObjects::default()
        };
        let merged = MergedRbacSource::new(Arc::new(tenant), Arc::new(shared));

        let names: Vec<String> = merged
            .cluster_role_bindings()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["local", "platform"]);
    }

    #[test]
    fn shared_role_bindings_stay_in_the_shared_scope() {
        let role_binding = |name: &str| RoleBinding {
            name: name.to_string(),
            namespace: "ns".to_string(),
            subjects: vec![Subject::group("g")],
            role_ref: RoleRef {
                kind: RoleRefKind::ClusterRole,
                name: "view".to_string(),
            },
        };
        let tenant = RbacObjects {
            role_bindings: vec![role_binding("local")],
            ..RbacObjects::default()
        };
        let shared = RbacObjects {
            role_bindings: vec![role_binding("platform")],
            ..RbacObjects::default()
        };
        let merged = MergedRbacSource::new(Arc::new(tenant), Arc::new(shared));

        let names: Vec<String> = merged
            .role_bindings("ns")
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["local"]);
    }
}
