use serde::{Deserialize, Serialize};

use crate::ResourceRequest;

/// Matches every verb, API group, resource or resource name.
pub const WILDCARD: &str = "*";

/// A single grant inside a role.
///
/// Each list is matched against one attribute of the request. An empty
/// `resource_names` list matches any object name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyRule {
    pub verbs: Vec<String>,

    #[serde(default)]
    pub api_groups: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub resource_names: Vec<String>,
}

impl PolicyRule {
    pub fn new<V, G, R>(verbs: V, api_groups: G, resources: R) -> Self
    where
        V: IntoIterator,
        V::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            verbs: verbs.into_iter().map(Into::into).collect(),
            api_groups: api_groups.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            resource_names: Vec::new(),
        }
    }

    pub fn with_resource_names<N>(mut self, names: N) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn allows(&self, request: &ResourceRequest) -> bool {
        verb_matches(&self.verbs, &request.verb)
            && api_group_matches(&self.api_groups, &request.api_group)
            && resource_matches(&self.resources, &request.resource, request.subresource.as_deref())
            && resource_name_matches(&self.resource_names, request.name.as_deref())
    }
}

fn verb_matches(verbs: &[String], verb: &str) -> bool {
    verbs.iter().any(|v| v == WILDCARD || v == verb)
}

fn api_group_matches(groups: &[String], group: &str) -> bool {
    groups.iter().any(|g| g == WILDCARD || g == group)
}

/// `resource/subresource` must be granted explicitly or through `*/subresource`.
fn resource_matches(resources: &[String], resource: &str, subresource: Option<&str>) -> bool {
    let combined = match subresource {
        Some(sub) if !sub.is_empty() => format!("{resource}/{sub}"),
        _ => resource.to_string(),
    };

    resources.iter().any(|r| {
        if r == WILDCARD || *r == combined {
            return true;
        }
        match subresource {
            Some(sub) if !sub.is_empty() => r.strip_prefix("*/") == Some(sub),
            _ => false,
        }
    })
}

fn resource_name_matches(names: &[String], name: Option<&str>) -> bool {
    if names.is_empty() {
        return true;
    }
    match name {
        Some(name) if !name.is_empty() => names.iter().any(|n| n == name),
        _ => false,
    }
}
