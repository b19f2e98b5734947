//! Maximal permission policy authorizer.
//!
//! Decision flow for one request:
//!
//! 1. Resolve the requesting tenant from the context.
//! 2. Find the binding serving `(group, resource)` in that tenant. Unbound
//!    resources go straight to the delegate.
//! 3. Find the bound export in its owning tenant. A dangling reference fails
//!    closed.
//! 4. Without a local maximal policy, go straight to the delegate.
//! 5. Evaluate RBAC in the owning tenant against the prefixed identity. Only
//!    an `Allow` there lets the delegate decide, on the original attributes.
//!
//! Every path writes one decision and one reason audit annotation. Errors
//! always end in `NoOpinion`.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use maxperm_apis::{ApiExport, ExportReference};
use maxperm_auth::{Attributes, AuthorizeError, Authorizer, Decision, RequestContext, Verdict};
use maxperm_core::{AccessError, AccessResult, TenantId};
use maxperm_infra::{InMemoryRbacStore, TenantIndex, find_binding_reference, find_export};

use crate::audit::{self, ACCESS_NOT_PERMITTED_REASON};
use crate::config::AuthorizerConfig;
use crate::factory::RbacAuthorizerFactory;
use crate::identity::IdentityRewriter;

type BindingLookup = Box<
    dyn Fn(&RequestContext, &Attributes, &TenantId) -> AccessResult<Option<ExportReference>>
        + Send
        + Sync,
>;
type ExportLookup = Box<
    dyn Fn(&RequestContext, &ExportReference) -> AccessResult<Option<Arc<ApiExport>>> + Send + Sync,
>;
type AuthorizerFactory = Box<dyn Fn(&TenantId) -> Arc<dyn Authorizer> + Send + Sync>;

/// Caps access to bound resources by the export's maximal permission policy.
///
/// Holds no per-request state; safe to share across concurrent requests.
pub struct MaximalPermissionPolicyAuthorizer {
    delegate: Arc<dyn Authorizer>,
    rewriter: IdentityRewriter,
    find_binding_reference: BindingLookup,
    find_export: ExportLookup,
    new_authorizer: AuthorizerFactory,
}

impl MaximalPermissionPolicyAuthorizer {
    /// Wire the authorizer to shared binding/export indexes and RBAC store.
    pub fn new(
        config: &AuthorizerConfig,
        bindings: Arc<dyn TenantIndex>,
        exports: Arc<dyn TenantIndex>,
        rbac: Arc<InMemoryRbacStore>,
        delegate: Arc<dyn Authorizer>,
    ) -> Self {
        let rbac = RbacAuthorizerFactory::new(rbac, config.local_admin_tenant.clone());
        Self::from_parts(
            delegate,
            IdentityRewriter::new(config.identity_prefix.clone()),
            move |ctx, attrs, tenant| {
                find_binding_reference(ctx, &*bindings, tenant, attrs.api_group(), attrs.resource())
            },
            move |ctx, reference| find_export(ctx, &*exports, reference),
            move |tenant| Arc::new(rbac.build(tenant)) as Arc<dyn Authorizer>,
        )
    }

    /// Assemble from individual collaborators.
    ///
    /// - `find_binding_reference`: export reference serving the request's
    ///   `(group, resource)` in the requesting tenant, if bound
    /// - `find_export`: the referenced export, if it exists
    /// - `new_authorizer`: secondary authorizer for an owning tenant
    pub fn from_parts<B, E, F>(
        delegate: Arc<dyn Authorizer>,
        rewriter: IdentityRewriter,
        find_binding_reference: B,
        find_export: E,
        new_authorizer: F,
    ) -> Self
    where
        B: Fn(&RequestContext, &Attributes, &TenantId) -> AccessResult<Option<ExportReference>>
            + Send
            + Sync
            + 'static,
        E: Fn(&RequestContext, &ExportReference) -> AccessResult<Option<Arc<ApiExport>>>
            + Send
            + Sync
            + 'static,
        F: Fn(&TenantId) -> Arc<dyn Authorizer> + Send + Sync + 'static,
    {
        Self {
            delegate,
            rewriter,
            find_binding_reference: Box::new(find_binding_reference),
            find_export: Box::new(find_export),
            new_authorizer: Box::new(new_authorizer),
        }
    }

    fn fail_closed(ctx: &RequestContext, audit_reason: String, err: AccessError) -> AuthorizeError {
        warn!(error = %err, reason = %audit_reason, "maximal permission policy check failed");
        audit::record(ctx, Decision::NoOpinion, &audit_reason);
        AuthorizeError::new(ACCESS_NOT_PERMITTED_REASON, err)
    }

    fn delegate(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
        audit_reason: &str,
    ) -> Result<Verdict, AuthorizeError> {
        debug!(reason = audit_reason, "deferring to delegate");
        audit::record(ctx, Decision::Allow, audit_reason);
        self.delegate.authorize(ctx, attrs)
    }
}

impl Authorizer for MaximalPermissionPolicyAuthorizer {
    #[instrument(
        level = "debug",
        name = "maximal_permission_policy",
        skip_all,
        fields(
            verb = %attrs.verb(),
            group = %attrs.api_group(),
            resource = %attrs.resource(),
        )
    )]
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        let tenant = match ctx.tenant() {
            Ok(tenant) => tenant,
            Err(err) => {
                let reason = format!("error getting tenant from request: {err}");
                return Err(Self::fail_closed(ctx, reason, err));
            }
        };

        let reference = match (self.find_binding_reference)(ctx, attrs, tenant) {
            Ok(Some(reference)) => reference,
            Ok(None) => return self.delegate(ctx, attrs, "no API binding bound"),
            Err(err) => {
                let reason = format!("error getting API binding reference: {err}");
                return Err(Self::fail_closed(ctx, reason, err));
            }
        };

        let path = &reference.path;
        let export_name = &reference.export_name;

        let export = match (self.find_export)(ctx, &reference) {
            Ok(Some(export)) => export,
            Ok(None) => {
                let reason = format!("API export {export_name:?} not found, path: \"{path}\"");
                debug!(%reason, "dangling export reference");
                audit::record(ctx, Decision::NoOpinion, &reason);
                return Ok(Verdict::no_opinion(ACCESS_NOT_PERMITTED_REASON));
            }
            Err(err) => {
                let reason = format!("error getting API export: {err}");
                return Err(Self::fail_closed(ctx, reason, err));
            }
        };

        let owner = &export.tenant;

        match &export.maximal_permission_policy {
            None => {
                let reason = format!(
                    "no maximal permission policy present in API export {:?}, \
                     path: \"{path}\", owning tenant: \"{owner}\"",
                    export.name
                );
                return self.delegate(ctx, attrs, &reason);
            }
            Some(policy) if policy.local.is_none() => {
                let reason = format!(
                    "no maximal local permission policy present in API export {:?}, \
                     path: \"{path}\", owning tenant: \"{owner}\"",
                    export.name
                );
                return self.delegate(ctx, attrs, &reason);
            }
            Some(_) => {}
        }

        let secondary = (self.new_authorizer)(owner);
        let prefixed = self.rewriter.rewrite(attrs);

        let verdict = match secondary.authorize(ctx, &prefixed) {
            Ok(verdict) => verdict,
            Err(err) => {
                let reason =
                    format!("error authorizing RBAC in API export tenant \"{owner}\": {err}");
                warn!(error = %err, %reason, "maximal permission policy evaluation failed");
                audit::record(ctx, Decision::NoOpinion, &reason);
                return Err(err);
            }
        };

        audit::record(
            ctx,
            verdict.decision,
            &format!("API export tenant \"{owner}\" reason: {}", verdict.reason),
        );

        if verdict.is_allowed() {
            debug!(owner = %owner, "maximal permission policy allows; deferring to delegate");
            return self.delegate.authorize(ctx, attrs);
        }

        debug!(
            owner = %owner,
            decision = %verdict.decision,
            "maximal permission policy does not allow"
        );
        Ok(Verdict::no_opinion(verdict.reason))
    }
}

impl core::fmt::Debug for MaximalPermissionPolicyAuthorizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MaximalPermissionPolicyAuthorizer")
            .field("rewriter", &self.rewriter)
            .finish_non_exhaustive()
    }
}
