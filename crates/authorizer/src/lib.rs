//! `maxperm-authorizer` — maximal permission policy authorization.
//!
//! For requests against resources served through an API binding, the export's
//! maximal permission policy is evaluated (against a prefixed identity, in the
//! export's owning tenant) before the delegate authorizer is consulted. Final
//! access requires both to allow.

pub mod audit;
pub mod config;
pub mod factory;
pub mod identity;
pub mod local;
pub mod maximal_permission;

pub use config::AuthorizerConfig;
pub use factory::RbacAuthorizerFactory;
pub use identity::{IdentityPrefix, IdentityRewriter, MAXIMAL_PERMISSION_POLICY_RBAC_PREFIX};
pub use local::LocalRbacAuthorizer;
pub use maximal_permission::MaximalPermissionPolicyAuthorizer;
