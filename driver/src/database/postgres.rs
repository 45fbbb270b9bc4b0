use std::ops::{Deref, DerefMut};

use error_stack::{Report, ResultExt};
use sqlx::pool::PoolOptions;
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::{KernelError, Reason};

use crate::error::ConvertError;
use crate::{env, env_or};

pub use self::{book::*, borrow::*, user::*};

mod book;
mod borrow;
#[cfg(test)]
mod contention;
mod user;

static POSTGRES_URL: &str = "POSTGRES_URL";
static POSTGRES_MAX_CONNECTIONS: &str = "POSTGRES_MAX_CONNECTIONS";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    /// Connects and brings the schema up to date.
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let max_connections = env_or(POSTGRES_MAX_CONNECTIONS, 10u32)?;
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .convert_error()?;
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(Report::from)
            .change_context(KernelError::Internal)
            .attach_printable("Failed to apply migrations")?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let con = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(con))
    }
}

/// Dropping without [`Transaction::commit`] rolls everything back.
pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: 'static> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                Error::PoolTimedOut => KernelError::Timeout,
                Error::Database(db) => match db.code().as_deref() {
                    // serialization_failure, deadlock_detected
                    Some("40001" | "40P01") => KernelError::Concurrency,
                    // unique_violation
                    Some("23505") => KernelError::Conflict,
                    _ => KernelError::Internal,
                },
                _ => KernelError::Internal,
            };
            let report = Report::from(error).change_context(context);
            match context {
                KernelError::Conflict => report.attach_printable(Reason::new("Resource already exists")),
                _ => report,
            }
        })
    }
}
