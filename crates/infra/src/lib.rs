//! Infrastructure layer: shared caches, RBAC storage and lookups over them.

pub mod index;
pub mod rbac_store;
pub mod resolvers;
pub mod snapshot;

pub use index::{InMemoryTenantIndex, TenantIndex};
pub use rbac_store::{InMemoryRbacStore, TenantRbacSource};
pub use resolvers::{find_binding_reference, find_export, index_binding, index_export};
pub use snapshot::{LoadedSnapshot, Snapshot, SnapshotError, TenantRbac};
