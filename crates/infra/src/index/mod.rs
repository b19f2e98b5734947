//! Tenant-partitioned object indexes (shared, read-mostly caches).

mod tenant_index;

pub use tenant_index::{IndexedObject, InMemoryTenantIndex, TenantIndex, downcast, typed_by_tenant};
