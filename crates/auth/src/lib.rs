//! `maxperm-auth` — authorization primitives (identity, attributes, decisions).
//!
//! This crate is intentionally decoupled from caches, storage and transport.

pub mod attributes;
pub mod authorize;
pub mod context;
pub mod rbac;
pub mod user;

pub use attributes::{Attributes, ResourceRequest};
pub use authorize::{AuthorizeError, Authorizer, AuthorizerFn, Decision, Verdict, authorizer_fn};
pub use context::{AuditAnnotation, AuditEvent, AuditSink, CancelHandle, RequestContext};
pub use user::UserInfo;
