use maxperm_core::AccessError;
use tracing::debug;

use crate::{Attributes, AuthorizeError, Authorizer, RequestContext, ResourceRequest, Verdict};

use super::roles::applicable_subject;
use super::{PolicyRule, RbacSource, RoleRef, RoleRefKind};

/// RBAC evaluator over a single [`RbacSource`].
///
/// Cluster role bindings are visited first, then the role bindings of the
/// request's namespace. The first matching rule allows. Bindings pointing at
/// roles that are not visible yet never fail the request; they are listed in
/// the `NoOpinion` reason.
#[derive(Debug, Clone)]
pub struct RbacAuthorizer<S> {
    source: S,
}

impl<S> RbacAuthorizer<S>
where
    S: RbacSource,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn resolve_rules(
        &self,
        namespace: &str,
        role_ref: &RoleRef,
    ) -> Result<Vec<PolicyRule>, AccessError> {
        match role_ref.kind {
            RoleRefKind::Role => self
                .source
                .role(namespace, &role_ref.name)?
                .map(|r| r.rules)
                .ok_or_else(|| {
                    AccessError::role_not_found("Role", format!("{namespace}/{}", role_ref.name))
                }),
            RoleRefKind::ClusterRole => self.resolve_cluster_rules(&role_ref.name),
        }
    }

    fn resolve_cluster_rules(&self, name: &str) -> Result<Vec<PolicyRule>, AccessError> {
        self.source
            .cluster_role(name)?
            .map(|r| r.rules)
            .ok_or_else(|| AccessError::role_not_found("ClusterRole", name))
    }
}

fn any_rule_allows(rules: &[PolicyRule], request: &ResourceRequest) -> bool {
    rules.iter().any(|rule| rule.allows(request))
}

fn listing_error(err: AccessError) -> AuthorizeError {
    AuthorizeError::new("RBAC: error listing bindings", err)
}

impl<S> Authorizer for RbacAuthorizer<S>
where
    S: RbacSource,
{
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> Result<Verdict, AuthorizeError> {
        ctx.err().map_err(|e| AuthorizeError::new("RBAC: request context is done", e))?;

        let user = attrs.user();
        let request = attrs.request();
        let mut errors: Vec<AccessError> = Vec::new();

        for binding in self.source.cluster_role_bindings().map_err(listing_error)? {
            let Some(subject) = applicable_subject(&binding.subjects, user) else {
                continue;
            };
            match self.resolve_cluster_rules(&binding.cluster_role) {
                Ok(rules) if any_rule_allows(&rules, request) => {
                    let reason = format!(
                        "RBAC: allowed by ClusterRoleBinding {:?} of ClusterRole {:?} to {subject}",
                        binding.name, binding.cluster_role
                    );
                    debug!(%reason, "rbac allow");
                    return Ok(Verdict::allow(reason));
                }
                Ok(_) => {}
                Err(err) => errors.push(err),
            }
        }

        if let Some(namespace) = request.namespace.as_deref() {
            for binding in self.source.role_bindings(namespace).map_err(listing_error)? {
                let Some(subject) = applicable_subject(&binding.subjects, user) else {
                    continue;
                };
                match self.resolve_rules(namespace, &binding.role_ref) {
                    Ok(rules) if any_rule_allows(&rules, request) => {
                        let kind = match binding.role_ref.kind {
                            RoleRefKind::Role => "Role",
                            RoleRefKind::ClusterRole => "ClusterRole",
                        };
                        let reason = format!(
                            "RBAC: allowed by RoleBinding \"{}/{}\" of {kind} {:?} to {subject}",
                            binding.name, namespace, binding.role_ref.name
                        );
                        debug!(%reason, "rbac allow");
                        return Ok(Verdict::allow(reason));
                    }
                    Ok(_) => {}
                    Err(err) => errors.push(err),
                }
            }
        }

        let mut reason = format!(
            "RBAC: no rule allows user {:?} to {} {:?} in API group {:?}",
            user.name, request.verb, request.resource, request.api_group
        );
        // Roles that are not visible yet are staleness, not failure.
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            debug!(errors = %joined, "rbac bindings reference unresolved roles");
            reason.push_str("; unresolved: ");
            reason.push_str(&joined);
        }
        Ok(Verdict::no_opinion(reason))
    }
}
