use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use maxperm_core::{AccessError, AccessResult, TenantId};

/// Untyped object as stored in a shared cache.
pub type IndexedObject = Arc<dyn Any + Send + Sync>;

/// Secondary index partitioning cached objects by tenant.
///
/// Implementations are read-mostly and eventually consistent: an object that
/// was just written may not be visible yet.
pub trait TenantIndex: Send + Sync {
    fn by_tenant(&self, tenant_key: &str) -> AccessResult<Vec<IndexedObject>>;
}

impl<I> TenantIndex for Arc<I>
where
    I: TenantIndex + ?Sized,
{
    fn by_tenant(&self, tenant_key: &str) -> AccessResult<Vec<IndexedObject>> {
        (**self).by_tenant(tenant_key)
    }
}

/// Narrow an untyped index entry to `T`.
pub fn downcast<T>(object: IndexedObject) -> AccessResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    object
        .downcast::<T>()
        .map_err(|_| AccessError::malformed(std::any::type_name::<T>()))
}

/// All objects of type `T` indexed under `tenant`.
///
/// Fails with [`AccessError::MalformedIndexEntry`] if any entry is not a `T`.
pub fn typed_by_tenant<T>(index: &dyn TenantIndex, tenant: &TenantId) -> AccessResult<Vec<Arc<T>>>
where
    T: Any + Send + Sync,
{
    index
        .by_tenant(tenant.index_key())?
        .into_iter()
        .map(downcast::<T>)
        .collect()
}

/// In-memory tenant index for tests/dev, fed by whatever watches the source
/// of truth.
///
/// Entries within a tenant are returned in name order.
#[derive(Default)]
pub struct InMemoryTenantIndex {
    inner: RwLock<HashMap<String, BTreeMap<String, IndexedObject>>>,
}

impl InMemoryTenantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, tenant: &TenantId, name: impl Into<String>, object: IndexedObject) {
        if let Ok(mut map) = self.inner.write() {
            map.entry(tenant.index_key().to_string())
                .or_default()
                .insert(name.into(), object);
        }
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, tenant: &TenantId, name: &str) -> bool {
        let Ok(mut map) = self.inner.write() else {
            return false;
        };
        let Some(entries) = map.get_mut(tenant.index_key()) else {
            return false;
        };
        let removed = entries.remove(name).is_some();
        if entries.is_empty() {
            map.remove(tenant.index_key());
        }
        removed
    }

    /// Drop every entry of a tenant (e.g. when the tenant is deleted).
    pub fn clear_tenant(&self, tenant: &TenantId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(tenant.index_key());
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(map) => map.values().map(BTreeMap::len).sum(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TenantIndex for InMemoryTenantIndex {
    fn by_tenant(&self, tenant_key: &str) -> AccessResult<Vec<IndexedObject>> {
        let map = self
            .inner
            .read()
            .map_err(|_| AccessError::index_lookup("tenant index lock poisoned"))?;

        Ok(map
            .get(tenant_key)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl core::fmt::Debug for InMemoryTenantIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryTenantIndex")
            .field("len", &self.len())
            .finish()
    }
}
