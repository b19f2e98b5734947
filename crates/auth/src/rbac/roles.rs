use serde::{Deserialize, Serialize};

use crate::UserInfo;

use super::PolicyRule;

/// Namespaced set of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Tenant-wide set of rules, usable from any namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRole {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    User,
    Group,
}

impl core::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SubjectKind::User => f.write_str("User"),
            SubjectKind::Group => f.write_str("Group"),
        }
    }
}

/// Who a binding grants its role to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
}

impl Subject {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::User,
            name: name.into(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::Group,
            name: name.into(),
        }
    }

    /// Exact, case-sensitive match against the identity's name or groups.
    pub fn applies_to(&self, user: &UserInfo) -> bool {
        match self.kind {
            SubjectKind::User => self.name == user.name,
            SubjectKind::Group => user.in_group(&self.name),
        }
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {:?}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleRefKind {
    Role,
    ClusterRole,
}

/// Role a [`RoleBinding`] points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRef {
    pub kind: RoleRefKind,
    pub name: String,
}

/// Grants a role (or cluster role) to subjects within one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub role_ref: RoleRef,
}

/// Grants a cluster role to subjects across the whole tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRoleBinding {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub cluster_role: String,
}

/// First subject of `subjects` that applies to `user`.
pub(crate) fn applicable_subject<'a>(
    subjects: &'a [Subject],
    user: &UserInfo,
) -> Option<&'a Subject> {
    subjects.iter().find(|s| s.applies_to(user))
}
