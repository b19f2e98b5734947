//! Request attributes evaluated by authorizers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::UserInfo;

/// What is being accessed: verb plus the (group, resource) being targeted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub verb: String,

    /// API group; the empty string is the core group.
    #[serde(default)]
    pub api_group: String,

    pub resource: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,

    /// Namespace for namespaced requests; `None` for cluster-scoped ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Object name, when the request targets a single object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceRequest {
    pub fn new(
        verb: impl Into<String>,
        api_group: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            verb: verb.into(),
            api_group: api_group.into(),
            resource: resource.into(),
            ..Self::default()
        }
    }

    pub fn with_subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Immutable input to an authorization decision.
///
/// The identity is owned; the resource portion sits behind an `Arc` so a copy
/// with a different identity shares it with the original instead of cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    user: UserInfo,
    request: Arc<ResourceRequest>,
}

impl Attributes {
    pub fn new(user: UserInfo, request: ResourceRequest) -> Self {
        Self {
            user,
            request: Arc::new(request),
        }
    }

    /// A copy carrying `user` as identity and the same resource request.
    pub fn with_user(&self, user: UserInfo) -> Self {
        Self {
            user,
            request: Arc::clone(&self.request),
        }
    }

    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn request(&self) -> &ResourceRequest {
        &self.request
    }

    /// True when `other` shares this value's resource request allocation.
    pub fn shares_request_with(&self, other: &Attributes) -> bool {
        Arc::ptr_eq(&self.request, &other.request)
    }

    pub fn verb(&self) -> &str {
        &self.request.verb
    }

    pub fn api_group(&self) -> &str {
        &self.request.api_group
    }

    pub fn resource(&self) -> &str {
        &self.request.resource
    }
}
