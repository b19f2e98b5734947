use serde::{Deserialize, Serialize};

use maxperm_core::TenantId;

/// Marks that the owning tenant's own RBAC objects define the maximal policy.
///
/// Only its presence matters to the authorizer; the grants themselves are
/// role bindings in the owning tenant written against prefixed identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalPolicy {}

/// Upper bound on what importers of an export can ever be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaximalPermissionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalPolicy>,
}

impl MaximalPermissionPolicy {
    pub fn local() -> Self {
        Self {
            local: Some(LocalPolicy {}),
        }
    }
}

/// A published API surface owned by one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiExport {
    /// Owning tenant.
    pub tenant: TenantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximal_permission_policy: Option<MaximalPermissionPolicy>,
}

impl ApiExport {
    pub fn new(tenant: TenantId, name: impl Into<String>) -> Self {
        Self {
            tenant,
            name: name.into(),
            maximal_permission_policy: None,
        }
    }

    pub fn with_maximal_permission_policy(mut self, policy: MaximalPermissionPolicy) -> Self {
        self.maximal_permission_policy = Some(policy);
        self
    }

    /// The local maximal policy component, if both layers are present.
    pub fn local_maximal_policy(&self) -> Option<&LocalPolicy> {
        self.maximal_permission_policy
            .as_ref()
            .and_then(|p| p.local.as_ref())
    }
}
