//! Strongly-typed identifiers used across the workspace.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Identifier of a tenant (logical scope, multi-tenant boundary).
///
/// Tenants are named by colon-separated paths such as `root:org:team`. Each
/// segment is lowercase alphanumeric, may contain `-`, and must not start or
/// end with `-`. The same type is used for owner paths in export references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

/// Name of the well-known scope holding platform-wide default roles.
pub const LOCAL_ADMIN_TENANT: &str = "system:admin";

impl TenantId {
    /// The shared local-admin scope.
    pub fn local_admin() -> Self {
        Self(LOCAL_ADMIN_TENANT.to_string())
    }

    /// Parse and validate a tenant name.
    pub fn parse(name: &str) -> Result<Self, AccessError> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which tenant-partitioned indexes store this tenant's objects.
    pub fn index_key(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), AccessError> {
    if name.is_empty() {
        return Err(AccessError::invalid_id("TenantId: empty name"));
    }

    for segment in name.split(':') {
        let valid_chars = segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if segment.is_empty() || !valid_chars || segment.starts_with('-') || segment.ends_with('-')
        {
            return Err(AccessError::invalid_id(format!(
                "TenantId: invalid segment {segment:?} in {name:?}"
            )));
        }
    }

    Ok(())
}

impl core::fmt::Display for TenantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}
