use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use maxperm_core::AccessError;

use crate::{Attributes, RequestContext};

/// Outcome of a single authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    Allow,
    Deny,
    /// The authorizer abstains; in a chain this is non-permitting unless
    /// another authorizer explicitly allows.
    NoOpinion,
}

impl Decision {
    /// Code written to audit annotations for this decision.
    pub fn audit_code(self) -> &'static str {
        match self {
            Decision::Allow => "Allowed",
            Decision::Deny => "Denied",
            Decision::NoOpinion => "NoOpinion",
        }
    }
}

impl core::fmt::Display for Decision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.audit_code())
    }
}

/// A decision plus the human-readable reason behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
}

impl Verdict {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }

    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new(Decision::Allow, reason)
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::new(Decision::Deny, reason)
    }

    pub fn no_opinion(reason: impl Into<String>) -> Self {
        Self::new(Decision::NoOpinion, reason)
    }

    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}

/// An authorizer failed to reach a decision.
///
/// Always treated as [`Decision::NoOpinion`] (fail closed). `reason` is the
/// user-facing explanation; `source` carries the underlying failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{source}")]
pub struct AuthorizeError {
    pub reason: String,
    pub source: AccessError,
}

impl AuthorizeError {
    pub fn new(reason: impl Into<String>, source: AccessError) -> Self {
        Self {
            reason: reason.into(),
            source,
        }
    }

    pub fn decision(&self) -> Decision {
        Decision::NoOpinion
    }
}

/// Authorization contract shared by the delegate chain, the RBAC evaluator and
/// the maximal permission policy authorizer.
///
/// - Synchronous; lookups may block on shared caches
/// - Must not mutate `attrs`
pub trait Authorizer: Send + Sync {
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError>;
}

impl<A> Authorizer for Arc<A>
where
    A: Authorizer + ?Sized,
{
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        (**self).authorize(ctx, attrs)
    }
}

impl<A> Authorizer for Box<A>
where
    A: Authorizer + ?Sized,
{
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        (**self).authorize(ctx, attrs)
    }
}

/// Adapter turning a closure into an [`Authorizer`].
pub struct AuthorizerFn<F>(F);

impl<F> Authorizer for AuthorizerFn<F>
where
    F: Fn(&RequestContext, &Attributes) -> Result<Verdict, AuthorizeError> + Send + Sync,
{
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        (self.0)(ctx, attrs)
    }
}

pub fn authorizer_fn<F>(f: F) -> AuthorizerFn<F>
where
    F: Fn(&RequestContext, &Attributes) -> Result<Verdict, AuthorizeError> + Send + Sync,
{
    AuthorizerFn(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResourceRequest, UserInfo};

    #[test]
    fn audit_codes() {
        assert_eq!(Decision::Allow.audit_code(), "Allowed");
        assert_eq!(Decision::Deny.audit_code(), "Denied");
        assert_eq!(Decision::NoOpinion.to_string(), "NoOpinion");
    }

    #[test]
    fn errors_never_permit() {
        let err = AuthorizeError::new("nope", AccessError::ContextDone);
        assert_eq!(err.decision(), Decision::NoOpinion);
        assert_eq!(err.to_string(), "request context is done");
    }

    #[test]
    fn closures_and_shared_pointers_are_authorizers() {
        let inner = Arc::new(authorizer_fn(|_ctx, attrs: &Attributes| {
            Ok(Verdict::allow(format!("hello {}", attrs.user().name)))
        }));
        let boxed: Box<dyn Authorizer> = Box::new(Arc::clone(&inner));

        let attrs = Attributes::new(
            UserInfo::new("alice"),
            ResourceRequest::new("get", "", "pods"),
        );
        let verdict = boxed.authorize(&RequestContext::new(), &attrs).unwrap();

        assert!(verdict.is_allowed());
        assert_eq!(verdict.reason, "hello alice");
    }
}
