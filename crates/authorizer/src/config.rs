//! Process-wide authorizer configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use maxperm_core::TenantId;

use crate::identity::IdentityPrefix;

pub const LOCAL_ADMIN_TENANT_ENV: &str = "MAXPERM_LOCAL_ADMIN_TENANT";
pub const IDENTITY_PREFIX_ENV: &str = "MAXPERM_IDENTITY_PREFIX";

/// `local_admin_tenant` holds platform-wide default roles merged into every
/// RBAC scope; `identity_prefix` is prepended to importer identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    pub local_admin_tenant: TenantId,
    pub identity_prefix: IdentityPrefix,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            local_admin_tenant: TenantId::local_admin(),
            identity_prefix: IdentityPrefix::default(),
        }
    }
}

impl AuthorizerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup; invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOCAL_ADMIN_TENANT_ENV) {
            match TenantId::parse(&raw) {
                Ok(tenant) => config.local_admin_tenant = tenant,
                Err(err) => {
                    warn!(%err, value = %raw, "{} invalid; using default", LOCAL_ADMIN_TENANT_ENV)
                }
            }
        }

        if let Some(raw) = lookup(IDENTITY_PREFIX_ENV) {
            match IdentityPrefix::try_from(raw) {
                Ok(prefix) => config.identity_prefix = prefix,
                Err(err) => warn!(%err, "{} invalid; using default", IDENTITY_PREFIX_ENV),
            }
        }

        config
    }
}
