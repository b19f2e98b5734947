use serde::{Deserialize, Serialize};

use maxperm_core::TenantId;

/// Points a binding at the export it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportReference {
    /// Path of the tenant that owns the export.
    pub path: TenantId,
    pub export_name: String,
}

impl ExportReference {
    pub fn new(path: TenantId, export_name: impl Into<String>) -> Self {
        Self {
            path,
            export_name: export_name.into(),
        }
    }
}

/// A (group, resource) pair served through a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundResource {
    #[serde(default)]
    pub group: String,
    pub resource: String,
}

impl BoundResource {
    pub fn new(group: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }

    /// Exact string match; no wildcards.
    pub fn matches(&self, group: &str, resource: &str) -> bool {
        self.group == group && self.resource == resource
    }
}

/// An importing tenant's subscription to an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBinding {
    /// Tenant the binding lives in (the importer).
    pub tenant: TenantId,
    pub name: String,
    pub reference: ExportReference,
    #[serde(default)]
    pub bound_resources: Vec<BoundResource>,
}

impl ApiBinding {
    /// The export reference, if this binding serves `(group, resource)`.
    pub fn reference_for(&self, group: &str, resource: &str) -> Option<&ExportReference> {
        self.bound_resources
            .iter()
            .any(|br| br.matches(group, resource))
            .then_some(&self.reference)
    }
}
