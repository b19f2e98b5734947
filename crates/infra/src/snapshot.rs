//! JSON snapshot of bindings, exports and RBAC objects.
//!
//! Loads a point-in-time view into the in-memory indexes, standing in for the
//! watch-fed caches in tests and offline checks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use maxperm_apis::{ApiBinding, ApiExport};
use maxperm_auth::rbac::RbacObjects;
use maxperm_core::TenantId;

use crate::index::InMemoryTenantIndex;
use crate::rbac_store::InMemoryRbacStore;
use crate::resolvers::{index_binding, index_export};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// RBAC objects of one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRbac {
    pub tenant: TenantId,
    #[serde(flatten)]
    pub objects: RbacObjects,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub bindings: Vec<ApiBinding>,
    #[serde(default)]
    pub exports: Vec<ApiExport>,
    #[serde(default)]
    pub rbac: Vec<TenantRbac>,
}

/// Indexes populated from a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub bindings: Arc<InMemoryTenantIndex>,
    pub exports: Arc<InMemoryTenantIndex>,
    pub rbac: Arc<InMemoryRbacStore>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn load(self) -> LoadedSnapshot {
        let bindings = Arc::new(InMemoryTenantIndex::new());
        let exports = Arc::new(InMemoryTenantIndex::new());
        let rbac = Arc::new(InMemoryRbacStore::new());

        let (binding_count, export_count) = (self.bindings.len(), self.exports.len());
        for binding in self.bindings {
            index_binding(&bindings, binding);
        }
        for export in self.exports {
            index_export(&exports, export);
        }
        for TenantRbac { tenant, objects } in self.rbac {
            rbac.replace_tenant(tenant, objects);
        }

        tracing::info!(bindings = binding_count, exports = export_count, "snapshot loaded");

        LoadedSnapshot {
            bindings,
            exports,
            rbac,
        }
    }
}
