//! `maxperm-core` — foundation types shared by every layer.
//!
//! This crate contains **pure** primitives (no IO, no caches, no policy).

pub mod error;
pub mod id;

pub use error::{AccessError, AccessResult};
pub use id::{LOCAL_ADMIN_TENANT, TenantId};
