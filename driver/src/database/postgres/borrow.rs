use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::BorrowQuery;
use kernel::interface::update::BorrowModifier;
use kernel::prelude::entity::{
    BookId, Borrow, BorrowId, BorrowStatus, CreatedAt, DueAt, IssuedAt, ReturnedAt, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBorrowRepository;

#[async_trait::async_trait]
impl BorrowQuery for PostgresBorrowRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        PgBorrowInternal::find_by_id(con, id, false).await
    }

    async fn lock_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        PgBorrowInternal::find_by_id(con, id, true).await
    }

    async fn find_by_user(
        &self,
        con: &mut PostgresTransaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        PgBorrowInternal::find_by_user(con, user_id, statuses).await
    }

    async fn find_by_status(
        &self,
        con: &mut PostgresTransaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        PgBorrowInternal::find_by_status(con, statuses).await
    }

    async fn count_by_user(
        &self,
        con: &mut PostgresTransaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_by_user(con, user_id, statuses).await
    }

    async fn count_by_book(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_by_book(con, book_id, statuses).await
    }

    async fn exists_for(
        &self,
        con: &mut PostgresTransaction,
        user_id: &UserId,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<bool, KernelError> {
        PgBorrowInternal::exists_for(con, user_id, book_id, statuses).await
    }

    async fn count_borrowers(
        &self,
        con: &mut PostgresTransaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_borrowers(con, statuses).await
    }
}

#[async_trait::async_trait]
impl BorrowModifier for PostgresBorrowRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowInternal::create(con, borrow).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowInternal::update(con, borrow).await
    }
}

#[derive(sqlx::FromRow)]
struct BorrowRow {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    status: String,
    requested_at: OffsetDateTime,
    issued_at: Option<OffsetDateTime>,
    due_at: OffsetDateTime,
    returned_at: Option<OffsetDateTime>,
    approved_by: Option<Uuid>,
}

impl TryFrom<BorrowRow> for Borrow {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: BorrowRow) -> Result<Self, Self::Error> {
        Ok(Borrow::new(
            BorrowId::new(value.id),
            BookId::new(value.book_id),
            UserId::new(value.user_id),
            value.status.parse()?,
            CreatedAt::new(value.requested_at),
            value.issued_at.map(IssuedAt::new),
            DueAt::new(value.due_at),
            value.returned_at.map(ReturnedAt::new),
            value.approved_by.map(UserId::new),
        ))
    }
}

fn status_names(statuses: &[BorrowStatus]) -> Vec<&'static str> {
    statuses.iter().map(BorrowStatus::as_str).collect()
}

pub(in crate::database) struct PgBorrowInternal;

impl PgBorrowInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BorrowId,
        lock: bool,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        let query = if lock {
            // language=postgresql
            r#"
            SELECT id, book_id, user_id, status, requested_at, issued_at, due_at, returned_at, approved_by
            FROM borrows
            WHERE id = $1
            FOR UPDATE
            "#
        } else {
            // language=postgresql
            r#"
            SELECT id, book_id, user_id, status, requested_at, issued_at, due_at, returned_at, approved_by
            FROM borrows
            WHERE id = $1
            "#
        };
        let row = sqlx::query_as::<_, BorrowRow>(query)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(Borrow::try_from).transpose()
    }

    async fn find_by_user(
        con: &mut PgConnection,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, user_id, status, requested_at, issued_at, due_at, returned_at, approved_by
            FROM borrows
            WHERE user_id = $1 AND status = ANY($2)
            ORDER BY requested_at DESC, id
            "#,
        )
        .bind(user_id.as_ref())
        .bind(status_names(statuses))
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Borrow::try_from).collect()
    }

    async fn find_by_status(
        con: &mut PgConnection,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, user_id, status, requested_at, issued_at, due_at, returned_at, approved_by
            FROM borrows
            WHERE status = ANY($1)
            ORDER BY COALESCE(issued_at, requested_at) DESC, id
            "#,
        )
        .bind(status_names(statuses))
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Borrow::try_from).collect()
    }

    async fn count_by_user(
        con: &mut PgConnection,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE user_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(user_id.as_ref())
        .bind(status_names(statuses))
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn count_by_book(
        con: &mut PgConnection,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE book_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(book_id.as_ref())
        .bind(status_names(statuses))
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn exists_for(
        con: &mut PgConnection,
        user_id: &UserId,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<bool, KernelError> {
        sqlx::query_scalar::<_, bool>(
            // language=postgresql
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrows
                WHERE user_id = $1 AND book_id = $2 AND status = ANY($3)
            )
            "#,
        )
        .bind(user_id.as_ref())
        .bind(book_id.as_ref())
        .bind(status_names(statuses))
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn count_borrowers(
        con: &mut PgConnection,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(DISTINCT user_id) FROM borrows
            WHERE status = ANY($1)
            "#,
        )
        .bind(status_names(statuses))
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn create(con: &mut PgConnection, borrow: &Borrow) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO borrows (id, book_id, user_id, status, requested_at, issued_at, due_at, returned_at, approved_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(borrow.id().as_ref())
        .bind(borrow.book_id().as_ref())
        .bind(borrow.user_id().as_ref())
        .bind(borrow.status().as_str())
        .bind(borrow.requested_at().as_ref())
        .bind(borrow.issued_at().map(|at| *at.as_ref()))
        .bind(borrow.due_at().as_ref())
        .bind(borrow.returned_at().map(|at| *at.as_ref()))
        .bind(borrow.approved_by().as_ref().map(|user| *user.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, borrow: &Borrow) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE borrows
            SET status = $2, issued_at = $3, due_at = $4, returned_at = $5, approved_by = $6
            WHERE id = $1
            "#,
        )
        .bind(borrow.id().as_ref())
        .bind(borrow.status().as_str())
        .bind(borrow.issued_at().map(|at| *at.as_ref()))
        .bind(borrow.due_at().as_ref())
        .bind(borrow.returned_at().map(|at| *at.as_ref()))
        .bind(borrow.approved_by().as_ref().map(|user| *user.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
