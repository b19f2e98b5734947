//! Role-based access control evaluator.
//!
//! Roles hold [`PolicyRule`]s; bindings grant roles to [`Subject`]s. The
//! [`RbacAuthorizer`] reads them through an [`RbacSource`], which may be a
//! [`MergedRbacSource`] spanning a tenant and a shared scope.

mod authorizer;
mod roles;
mod rules;
mod source;

pub use authorizer::RbacAuthorizer;
pub use roles::{
    ClusterRole, ClusterRoleBinding, Role, RoleBinding, RoleRef, RoleRefKind, Subject, SubjectKind,
};
pub use rules::{PolicyRule, WILDCARD};
pub use source::{MergedRbacSource, RbacObjects, RbacSource};
