//! `maxperm-apis` — API export and binding objects.
//!
//! These are read-only to the authorizer; their lifecycle is owned by
//! whatever reconciles them into the shared caches.

pub mod binding;
pub mod export;

pub use binding::{ApiBinding, BoundResource, ExportReference};
pub use export::{ApiExport, LocalPolicy, MaximalPermissionPolicy};
