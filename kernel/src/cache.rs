use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Home page summary built from the whole catalog and ledger.
    pub fn home() -> Self {
        Self::new("homeData")
    }
}

/// Read-path cache over catalog data.
///
/// Entries expire on their own after the implementation's TTL; writers call
/// [`CatalogCache::invalidate`] as soon as the data behind a key changes.
#[async_trait::async_trait]
pub trait CatalogCache: 'static + Sync + Send {
    async fn get<T>(&self, key: &CacheKey) -> error_stack::Result<Option<T>, KernelError>
    where
        T: for<'de> Deserialize<'de> + Send;

    async fn set<T>(&self, key: &CacheKey, value: &T) -> error_stack::Result<(), KernelError>
    where
        T: Serialize + Sync;

    async fn invalidate(&self, key: &CacheKey) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnCatalogCache: 'static + Sync + Send {
    type CatalogCache: CatalogCache;
    fn catalog_cache(&self) -> &Self::CatalogCache;
}
