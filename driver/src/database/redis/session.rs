use error_stack::{Report, ResultExt};
use redis::AsyncCommands;
use uuid::Uuid;

use kernel::interface::session::SessionStore;
use kernel::prelude::entity::{AccessToken, UserId};
use kernel::KernelError;

use crate::database::redis::RedisDatabase;
use crate::env_or;
use crate::error::ConvertError;

const ACCESS_TOKEN_TTL_SECONDS: &str = "ACCESS_TOKEN_TTL_SECONDS";

fn token_key(token: &AccessToken) -> String {
    format!("access_token:{}", token.as_ref())
}

#[derive(Clone)]
pub struct RedisSessionStore {
    db: RedisDatabase,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(db: RedisDatabase) -> error_stack::Result<Self, KernelError> {
        let ttl = env_or(ACCESS_TOKEN_TTL_SECONDS, 86400)?;
        Ok(Self::with_ttl(db, ttl))
    }

    pub fn with_ttl(db: RedisDatabase, ttl: u64) -> Self {
        Self { db, ttl }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn issue(&self, user_id: &UserId) -> error_stack::Result<AccessToken, KernelError> {
        let token = AccessToken::new(Uuid::new_v4().simple().to_string());
        let mut con = self.db.connection().await?;
        redis::cmd("SET")
            .arg(token_key(&token))
            .arg(user_id.as_ref().to_string())
            .arg("EX")
            .arg(self.ttl)
            .query_async::<_, ()>(&mut con)
            .await
            .convert_error()?;
        Ok(token)
    }

    async fn resolve(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<UserId>, KernelError> {
        let mut con = self.db.connection().await?;
        let raw: Option<String> = con.get(token_key(token)).await.convert_error()?;
        raw.map(|raw| {
            Uuid::parse_str(&raw)
                .map(UserId::new)
                .map_err(Report::from)
                .change_context(KernelError::Internal)
        })
        .transpose()
    }

    async fn revoke(&self, token: &AccessToken) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.connection().await?;
        con.del::<_, ()>(token_key(token)).await.convert_error()
    }
}
