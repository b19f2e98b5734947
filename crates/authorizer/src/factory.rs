//! Secondary (RBAC) authorizers scoped to a tenant.

use std::sync::Arc;

use maxperm_auth::rbac::{MergedRbacSource, RbacAuthorizer, RbacObjects, RbacSource};
use maxperm_core::TenantId;
use maxperm_infra::InMemoryRbacStore;

/// Builds RBAC authorizers over a tenant's own objects merged with the shared
/// local-admin scope (namespaced role bindings excepted).
#[derive(Debug, Clone)]
pub struct RbacAuthorizerFactory {
    store: Arc<InMemoryRbacStore>,
    local_admin: TenantId,
}

impl RbacAuthorizerFactory {
    pub fn new(store: Arc<InMemoryRbacStore>, local_admin: TenantId) -> Self {
        Self { store, local_admin }
    }

    pub fn local_admin(&self) -> &TenantId {
        &self.local_admin
    }

    pub fn build(&self, tenant: &TenantId) -> RbacAuthorizer<MergedRbacSource> {
        let own: Arc<dyn RbacSource> = Arc::new(self.store.scope(tenant.clone()));
        // The admin scope itself is not merged with itself.
        let shared: Arc<dyn RbacSource> = if *tenant == self.local_admin {
            Arc::new(RbacObjects::default())
        } else {
            Arc::new(self.store.scope(self.local_admin.clone()))
        };
        RbacAuthorizer::new(MergedRbacSource::new(own, shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxperm_auth::rbac::{ClusterRole, ClusterRoleBinding, PolicyRule, Subject};
    use maxperm_auth::{Attributes, Authorizer, Decision, RequestContext, ResourceRequest, UserInfo};

    fn tenant(name: &str) -> TenantId {
        TenantId::parse(name).unwrap()
    }

    fn grant(store: &InMemoryRbacStore, scope: &TenantId, group: &str, verb: &str) {
        store.upsert_cluster_role(
            scope,
            ClusterRole {
                name: format!("{verb}-widgets"),
                rules: vec![PolicyRule::new([verb], ["widgets.example"], ["widgets"])],
            },
        );
        store.upsert_cluster_role_binding(
            scope,
            ClusterRoleBinding {
                name: format!("{group}-{verb}"),
                subjects: vec![Subject::group(group)],
                cluster_role: format!("{verb}-widgets"),
            },
        );
    }

    fn request(group: &str, verb: &str) -> Attributes {
        Attributes::new(
            UserInfo::new("u").with_groups([group]),
            ResourceRequest::new(verb, "widgets.example", "widgets"),
        )
    }

    #[test]
    fn tenant_and_admin_scopes_are_merged() {
        let store = Arc::new(InMemoryRbacStore::new());
        let admin = TenantId::local_admin();
        let b = tenant("root:b");
        grant(&store, &b, "viewers", "list");
        grant(&store, &admin, "auditors", "get");

        let factory = RbacAuthorizerFactory::new(store, admin);
        let authz = factory.build(&b);
        let ctx = RequestContext::new();

        assert!(authz.authorize(&ctx, &request("viewers", "list")).unwrap().is_allowed());
        assert!(authz.authorize(&ctx, &request("auditors", "get")).unwrap().is_allowed());
        assert_eq!(
            authz.authorize(&ctx, &request("viewers", "delete")).unwrap().decision,
            Decision::NoOpinion
        );
    }

    #[test]
    fn other_tenants_do_not_leak_in() {
        let store = Arc::new(InMemoryRbacStore::new());
        grant(&store, &tenant("root:c"), "viewers", "list");

        let factory = RbacAuthorizerFactory::new(store, TenantId::local_admin());
        let verdict = factory
            .build(&tenant("root:b"))
            .authorize(&RequestContext::new(), &request("viewers", "list"))
            .unwrap();

        assert_eq!(verdict.decision, Decision::NoOpinion);
    }

    #[test]
    fn admin_scope_is_not_doubled() {
        let store = Arc::new(InMemoryRbacStore::new());
        let admin = TenantId::local_admin();
        grant(&store, &admin, "auditors", "get");

        let factory = RbacAuthorizerFactory::new(store, admin.clone());
        let bindings = factory.build(&admin).source().cluster_role_bindings().unwrap();

        assert_eq!(bindings.len(), 1);
    }
}
