//! The requesting tenant's own RBAC, usable as the delegate authorizer.

use maxperm_auth::{Attributes, AuthorizeError, Authorizer, RequestContext, Verdict};

use crate::factory::RbacAuthorizerFactory;

/// Evaluates RBAC in whichever tenant the request was made in.
#[derive(Debug, Clone)]
pub struct LocalRbacAuthorizer {
    factory: RbacAuthorizerFactory,
}

impl LocalRbacAuthorizer {
    pub fn new(factory: RbacAuthorizerFactory) -> Self {
        Self { factory }
    }
}

impl Authorizer for LocalRbacAuthorizer {
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        let tenant = ctx
            .tenant()
            .map_err(|e| AuthorizeError::new("RBAC: no tenant in request context", e))?;
        self.factory.build(tenant).authorize(ctx, attrs)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use maxperm_auth::rbac::{ClusterRole, ClusterRoleBinding, PolicyRule, Subject};
    use maxperm_auth::{Decision, ResourceRequest, UserInfo};
    use maxperm_core::{AccessError, TenantId};
    use maxperm_infra::InMemoryRbacStore;

    #[test]
    fn evaluates_in_the_requesting_tenant() {
        let store = Arc::new(InMemoryRbacStore::new());
        let a = TenantId::parse("root:a").unwrap();
        store.upsert_cluster_role(
            &a,
            ClusterRole {
                name: "edit".to_string(),
                rules: vec![PolicyRule::new(["*"], ["widgets.example"], ["widgets"])],
            },
        );
        store.upsert_cluster_role_binding(
            &a,
            ClusterRoleBinding {
                name: "editors".to_string(),
                subjects: vec![Subject::group("editors")],
                cluster_role: "edit".to_string(),
            },
        );
        let local =
            LocalRbacAuthorizer::new(RbacAuthorizerFactory::new(store, TenantId::local_admin()));
        let attrs = Attributes::new(
            UserInfo::new("e").with_groups(["editors"]),
            ResourceRequest::new("delete", "widgets.example", "widgets"),
        );

        let in_a = local.authorize(&RequestContext::new().with_tenant(a), &attrs).unwrap();
        assert!(in_a.is_allowed());

        let in_b = local
            .authorize(
                &RequestContext::new().with_tenant(TenantId::parse("root:b").unwrap()),
                &attrs,
            )
            .unwrap();
        assert_eq!(in_b.decision, Decision::NoOpinion);

        let err = local.authorize(&RequestContext::new(), &attrs).unwrap_err();
        assert!(matches!(err.source, AccessError::TenantUnresolved(_)));
    }
}
