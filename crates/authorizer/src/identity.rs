//! Identity remapping for maximal permission policy evaluation.

use serde::{Deserialize, Serialize};

use maxperm_auth::{Attributes, UserInfo};
use maxperm_core::AccessError;

/// Prefix given to user and group names when evaluating a maximal policy.
///
/// Role bindings in the owning tenant must name `maxpermission:<group>` to
/// grant anything to importers, so they never collide with the owning
/// tenant's own identities.
pub const MAXIMAL_PERMISSION_POLICY_RBAC_PREFIX: &str = "maxpermission:";

/// Non-empty prefix for importer identities.
///
/// An empty prefix would hand the importer's raw identity to the owning
/// tenant's RBAC, so it is rejected on every construction path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityPrefix(String);

impl IdentityPrefix {
    pub fn parse(prefix: &str) -> Result<Self, AccessError> {
        Self::try_from(prefix.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdentityPrefix {
    fn default() -> Self {
        Self(MAXIMAL_PERMISSION_POLICY_RBAC_PREFIX.to_string())
    }
}

impl TryFrom<String> for IdentityPrefix {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(AccessError::invalid_id("identity prefix must not be empty"));
        }
        Ok(Self(value))
    }
}

impl From<IdentityPrefix> for String {
    fn from(value: IdentityPrefix) -> Self {
        value.0
    }
}

impl core::fmt::Display for IdentityPrefix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityRewriter {
    prefix: IdentityPrefix,
}

impl IdentityRewriter {
    pub fn new(prefix: IdentityPrefix) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// A copy of `attrs` whose user name and every group carry the prefix once.
    ///
    /// `attrs` is left untouched; the resource request is shared, not copied.
    pub fn rewrite(&self, attrs: &Attributes) -> Attributes {
        let user = attrs.user();
        let prefixed = UserInfo {
            name: format!("{}{}", self.prefix, user.name),
            uid: user.uid.clone(),
            groups: user
                .groups
                .iter()
                .map(|g| format!("{}{}", self.prefix, g))
                .collect(),
            extra: user.extra.clone(),
        };
        attrs.with_user(prefixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxperm_auth::ResourceRequest;
    use proptest::prelude::*;

    #[test]
    fn prefixes_name_and_groups() {
        let attrs = Attributes::new(
            UserInfo::new("alice").with_groups(["viewers", "system:authenticated"]),
            ResourceRequest::new("list", "widgets.example", "widgets"),
        );

        let rewritten = IdentityRewriter::default().rewrite(&attrs);

        assert_eq!(rewritten.user().name, "maxpermission:alice");
        assert_eq!(
            rewritten.user().groups,
            vec!["maxpermission:viewers", "maxpermission:system:authenticated"]
        );
        assert!(rewritten.shares_request_with(&attrs));
        assert_eq!(attrs.user().name, "alice");
        assert_eq!(attrs.user().groups, vec!["viewers", "system:authenticated"]);
    }

    #[test]
    fn no_groups_stays_no_groups() {
        let attrs = Attributes::new(UserInfo::new("bob"), ResourceRequest::new("get", "", "pods"));
        let rewritten = IdentityRewriter::new(IdentityPrefix::parse("p:").unwrap()).rewrite(&attrs);
        assert_eq!(rewritten.user().name, "p:bob");
        assert!(rewritten.user().groups.is_empty());
    }

    #[test]
    fn empty_prefixes_are_rejected() {
        for bad in ["", "   "] {
            assert!(matches!(IdentityPrefix::parse(bad), Err(AccessError::InvalidId(_))));
            assert!(serde_json::from_value::<IdentityPrefix>(serde_json::json!(bad)).is_err());
        }
        assert_eq!(IdentityRewriter::default().prefix(), MAXIMAL_PERMISSION_POLICY_RBAC_PREFIX);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every rewritten name is the original with the prefix added
        /// exactly once, and the original attributes are unchanged.
        #[test]
        fn prefix_applied_exactly_once(
            name in "[a-z:]{0,12}",
            groups in prop::collection::vec("[a-z:]{0,12}", 0..6),
        ) {
            let original = Attributes::new(
                UserInfo::new(name.clone()).with_groups(groups.clone()),
                ResourceRequest::new("get", "g", "r"),
            );
            let snapshot = original.clone();
            let rewriter = IdentityRewriter::default();

            let rewritten = rewriter.rewrite(&original);

            prop_assert_eq!(&original, &snapshot);
            prop_assert_eq!(
                rewritten.user().name.strip_prefix(rewriter.prefix()),
                Some(name.as_str())
            );
            prop_assert_eq!(rewritten.user().groups.len(), groups.len());
            for (got, want) in rewritten.user().groups.iter().zip(&groups) {
                prop_assert_eq!(got.strip_prefix(rewriter.prefix()), Some(want.as_str()));
            }
        }
    }
}
