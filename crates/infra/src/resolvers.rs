//! Binding and export lookups against the shared tenant indexes.
//!
//! "Not found" is `Ok(None)`; only index failures are errors.

use std::sync::Arc;

use tracing::warn;

use maxperm_apis::{ApiBinding, ApiExport, ExportReference};
use maxperm_auth::RequestContext;
use maxperm_core::{AccessResult, TenantId};

use crate::index::{InMemoryTenantIndex, TenantIndex, typed_by_tenant};

/// Export reference of the first binding in `tenant` serving `(group, resource)`.
///
/// Only bindings indexed under the requesting tenant are considered.
pub fn find_binding_reference(
    ctx: &RequestContext,
    index: &dyn TenantIndex,
    tenant: &TenantId,
    group: &str,
    resource: &str,
) -> AccessResult<Option<ExportReference>> {
    ctx.err()?;

    for binding in typed_by_tenant::<ApiBinding>(index, tenant)? {
        if binding.tenant != *tenant {
            warn!(
                binding = %binding.name,
                indexed_under = %tenant,
                owner = %binding.tenant,
                "skipping binding indexed under foreign tenant"
            );
            continue;
        }
        if let Some(reference) = binding.reference_for(group, resource) {
            return Ok(Some(reference.clone()));
        }
    }

    Ok(None)
}

/// The export named by `reference`, looked up in its owning tenant only.
pub fn find_export(
    ctx: &RequestContext,
    index: &dyn TenantIndex,
    reference: &ExportReference,
) -> AccessResult<Option<Arc<ApiExport>>> {
    ctx.err()?;

    Ok(typed_by_tenant::<ApiExport>(index, &reference.path)?
        .into_iter()
        .find(|export| export.tenant == reference.path && export.name == reference.export_name))
}

/// Index a binding under its own tenant.
pub fn index_binding(index: &InMemoryTenantIndex, binding: ApiBinding) {
    let tenant = binding.tenant.clone();
    let name = binding.name.clone();
    index.upsert(&tenant, name, Arc::new(binding));
}

/// Index an export under its owning tenant.
pub fn index_export(index: &InMemoryTenantIndex, export: ApiExport) {
    let tenant = export.tenant.clone();
    let name = export.name.clone();
    index.upsert(&tenant, name, Arc::new(export));
}
