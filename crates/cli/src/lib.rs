//! `maxperm-check`: evaluate one request against a JSON snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use maxperm_auth::{
    Attributes, AuditAnnotation, AuditEvent, Authorizer, Decision, RequestContext, ResourceRequest,
    UserInfo, Verdict, authorizer_fn,
};
use maxperm_authorizer::{
    AuthorizerConfig, LocalRbacAuthorizer, MaximalPermissionPolicyAuthorizer, RbacAuthorizerFactory,
};
use maxperm_core::TenantId;
use maxperm_infra::Snapshot;

/// Authorizer consulted after the maximal permission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DelegateKind {
    /// RBAC of the requesting tenant merged with the local-admin scope.
    #[default]
    LocalRbac,
    /// Allow everything; isolates the maximal permission policy.
    AllowAll,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "maxperm-check", about = "Check a request against maximal permission policies")]
pub struct Args {
    /// Snapshot of bindings, exports and RBAC objects (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Tenant the request is made in
    #[arg(long)]
    pub tenant: String,

    /// Requesting user name
    #[arg(long)]
    pub user: String,

    /// Group of the requesting user (repeatable)
    #[arg(long = "group")]
    pub groups: Vec<String>,

    #[arg(long)]
    pub verb: String,

    /// API group of the resource (empty for the core group)
    #[arg(long, default_value = "")]
    pub api_group: String,

    #[arg(long)]
    pub resource: String,

    #[arg(long)]
    pub subresource: Option<String>,

    #[arg(long)]
    pub namespace: Option<String>,

    /// Object name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, value_enum, default_value_t = DelegateKind::LocalRbac)]
    pub delegate: DelegateKind,
}

impl Args {
    pub fn attributes(&self) -> Attributes {
        let mut request = ResourceRequest::new(&self.verb, &self.api_group, &self.resource);
        if let Some(sub) = &self.subresource {
            request = request.with_subresource(sub);
        }
        if let Some(ns) = &self.namespace {
            request = request.with_namespace(ns);
        }
        if let Some(name) = &self.name {
            request = request.with_name(name);
        }

        Attributes::new(
            UserInfo::new(&self.user).with_groups(self.groups.iter().cloned()),
            request,
        )
    }
}

/// Outcome of one check, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub request_id: String,
    pub tenant: String,
    pub decision: Decision,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub audit: Vec<AuditAnnotation>,
}

impl Report {
    pub fn allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}

/// Load the snapshot, wire the authorizer and evaluate the request.
pub fn check(args: &Args, config: &AuthorizerConfig) -> anyhow::Result<Report> {
    let tenant = TenantId::parse(&args.tenant).context("invalid --tenant")?;
    let snapshot = Snapshot::from_path(&args.snapshot)?;
    let loaded = snapshot.load();

    let delegate: Arc<dyn Authorizer> = match args.delegate {
        DelegateKind::LocalRbac => Arc::new(LocalRbacAuthorizer::new(RbacAuthorizerFactory::new(
            Arc::clone(&loaded.rbac),
            config.local_admin_tenant.clone(),
        ))),
        DelegateKind::AllowAll => {
            Arc::new(authorizer_fn(|_, _| Ok(Verdict::allow("allow-all delegate"))))
        }
    };

    let authorizer = MaximalPermissionPolicyAuthorizer::new(
        config,
        loaded.bindings,
        loaded.exports,
        loaded.rbac,
        delegate,
    );

    let audit = Arc::new(AuditEvent::new());
    let ctx = RequestContext::new()
        .with_tenant(tenant.clone())
        .with_audit(audit.clone());

    let (decision, reason, error) = match authorizer.authorize(&ctx, &args.attributes()) {
        Ok(verdict) => (verdict.decision, verdict.reason, None),
        Err(err) => (err.decision(), err.reason.clone(), Some(err.to_string())),
    };

    info!(request_id = %ctx.request_id(), %tenant, %decision, "request checked");

    Ok(Report {
        request_id: ctx.request_id().to_string(),
        tenant: tenant.to_string(),
        decision,
        reason,
        error,
        audit: audit.annotations(),
    })
}
