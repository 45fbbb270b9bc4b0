use error_stack::{Report, ResultExt};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use kernel::interface::cache::{CacheKey, CatalogCache};
use kernel::KernelError;

use crate::database::redis::RedisDatabase;
use crate::env_or;
use crate::error::ConvertError;

const CACHE_TTL_SECONDS: &str = "CACHE_TTL_SECONDS";

/// JSON values in Redis, each written with an expiry.
#[derive(Clone)]
pub struct RedisCatalogCache {
    db: RedisDatabase,
    ttl: u64,
}

impl RedisCatalogCache {
    pub fn new(db: RedisDatabase) -> error_stack::Result<Self, KernelError> {
        let ttl = env_or(CACHE_TTL_SECONDS, 300)?;
        Ok(Self::with_ttl(db, ttl))
    }

    pub fn with_ttl(db: RedisDatabase, ttl: u64) -> Self {
        Self { db, ttl }
    }
}

#[async_trait::async_trait]
impl CatalogCache for RedisCatalogCache {
    async fn get<T>(&self, key: &CacheKey) -> error_stack::Result<Option<T>, KernelError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        let mut con = self.db.connection().await?;
        let raw: Option<String> = con.get(key.as_ref()).await.convert_error()?;
        raw.map(|raw| {
            serde_json::from_str(&raw)
                .map_err(Report::from)
                .change_context(KernelError::Internal)
                .attach_printable_lazy(|| format!("Unreadable cache entry: {}", key.as_ref()))
        })
        .transpose()
    }

    async fn set<T>(&self, key: &CacheKey, value: &T) -> error_stack::Result<(), KernelError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)
            .map_err(Report::from)
            .change_context(KernelError::Internal)?;
        let mut con = self.db.connection().await?;
        redis::cmd("SET")
            .arg(key.as_ref())
            .arg(raw)
            .arg("EX")
            .arg(self.ttl)
            .query_async::<_, ()>(&mut con)
            .await
            .convert_error()
    }

    async fn invalidate(&self, key: &CacheKey) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.connection().await?;
        con.del::<_, ()>(key.as_ref()).await.convert_error()?;
        tracing::debug!("invalidated cache entry {}", key.as_ref());
        Ok(())
    }
}
