//! Audit annotations written by the maximal permission policy authorizer.

use maxperm_auth::{Decision, RequestContext};

/// Reason returned to callers when the authorizer fails closed.
pub const ACCESS_NOT_PERMITTED_REASON: &str = "access not permitted by maximal permission policy";

pub const AUDIT_PREFIX: &str = "maxpermissionpolicy.authorization/";
pub const AUDIT_DECISION_KEY: &str = "maxpermissionpolicy.authorization/decision";
pub const AUDIT_REASON_KEY: &str = "maxpermissionpolicy.authorization/reason";

/// Write the decision code and reason, in that order, in one call.
pub fn record(ctx: &RequestContext, decision: Decision, reason: &str) {
    ctx.add_audit_annotations(&[
        (AUDIT_DECISION_KEY, decision.audit_code()),
        (AUDIT_REASON_KEY, reason),
    ]);
}
