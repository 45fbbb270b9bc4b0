use driver::database::{
    PostgresBookRepository, PostgresBorrowRepository, PostgresDatabase, PostgresUserRepository,
    RedisCatalogCache, RedisDatabase, RedisSessionStore,
};
use driver::storage::LocalCoverStorage;
use kernel::interface::cache::DependOnCatalogCache;
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::query::{DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery};
use kernel::interface::session::DependOnSessionStore;
use kernel::interface::storage::DependOnCoverStorage;
use kernel::interface::update::{
    DependOnBookModifier, DependOnBorrowModifier, DependOnUserModifier,
};
use kernel::KernelError;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

pub struct Handler {
    pgpool: PostgresDatabase,
    cache: RedisCatalogCache,
    sessions: RedisSessionStore,
    covers: LocalCoverStorage,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let pgpool = PostgresDatabase::new().await?;
        let redis = RedisDatabase::new()?;
        let cache = RedisCatalogCache::new(redis.clone())?;
        let sessions = RedisSessionStore::new(redis)?;
        let covers = LocalCoverStorage::new()?;

        Ok(Self {
            pgpool,
            cache,
            sessions,
            covers,
        })
    }
}

impl DependOnDatabaseConnection for Handler {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.pgpool
    }
}

impl DependOnBookQuery for Handler {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier for Handler {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

impl DependOnBorrowQuery for Handler {
    type BorrowQuery = PostgresBorrowRepository;
    fn borrow_query(&self) -> &Self::BorrowQuery {
        &PostgresBorrowRepository
    }
}

impl DependOnBorrowModifier for Handler {
    type BorrowModifier = PostgresBorrowRepository;
    fn borrow_modifier(&self) -> &Self::BorrowModifier {
        &PostgresBorrowRepository
    }
}

impl DependOnUserQuery for Handler {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnUserModifier for Handler {
    type UserModifier = PostgresUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &PostgresUserRepository
    }
}

impl DependOnCatalogCache for Handler {
    type CatalogCache = RedisCatalogCache;
    fn catalog_cache(&self) -> &Self::CatalogCache {
        &self.cache
    }
}

impl DependOnSessionStore for Handler {
    type SessionStore = RedisSessionStore;
    fn session_store(&self) -> &Self::SessionStore {
        &self.sessions
    }
}

impl DependOnCoverStorage for Handler {
    type CoverStorage = LocalCoverStorage;
    fn cover_storage(&self) -> &Self::CoverStorage {
        &self.covers
    }
}
