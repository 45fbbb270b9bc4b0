use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Book, BookAuthor, BookCategory, BookCopies, BookCover, BookDescription, BookId, BookIsbn,
    BookPrice, BookTitle, CategorySummary, CreatedAt, SelectLimit, SelectOffset, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id, false).await
    }

    async fn lock_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id, true).await
    }

    async fn find_by_isbn(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_isbn(con, isbn).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con, limit, offset).await
    }

    async fn find_latest(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_latest(con, limit).await
    }

    async fn count(&self, con: &mut PostgresTransaction) -> error_stack::Result<i64, KernelError> {
        PgBookInternal::count(con).await
    }

    async fn count_categories(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<i64, KernelError> {
        PgBookInternal::count_categories(con).await
    }

    async fn top_categories(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<CategorySummary>, KernelError> {
        PgBookInternal::top_categories(con, limit).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con, book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con, book).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::delete(con, book_id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    isbn: String,
    title: String,
    author: String,
    category: String,
    description: String,
    total_copies: i32,
    available_copies: i32,
    price: i32,
    cover_image: Option<String>,
    cover_id: Option<String>,
    added_by: Option<Uuid>,
    created_at: OffsetDateTime,
}

impl TryFrom<BookRow> for Book {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: BookRow) -> Result<Self, Self::Error> {
        let copies = BookCopies::restore(value.total_copies, value.available_copies)?;
        let cover = value
            .cover_image
            .map(|url| BookCover::new(url, value.cover_id));
        Ok(Book::new(
            BookId::new(value.id),
            BookIsbn::new(value.isbn),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            BookCategory::new(value.category),
            BookDescription::new(value.description),
            copies,
            BookPrice::new(value.price)?,
            cover,
            value.added_by.map(UserId::new),
            CreatedAt::new(value.created_at),
        ))
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category: String,
    count: i64,
    cover_image: Option<String>,
}

impl From<CategoryRow> for CategorySummary {
    fn from(value: CategoryRow) -> Self {
        CategorySummary {
            category: BookCategory::new(value.category),
            count: value.count,
            cover_image: value.cover_image,
        }
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
        lock: bool,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let query = if lock {
            // language=postgresql
            r#"
            SELECT id, isbn, title, author, category, description, total_copies,
                   available_copies, price, cover_image, cover_id, added_by, created_at
            FROM books
            WHERE id = $1
            FOR UPDATE
            "#
        } else {
            // language=postgresql
            r#"
            SELECT id, isbn, title, author, category, description, total_copies,
                   available_copies, price, cover_image, cover_id, added_by, created_at
            FROM books
            WHERE id = $1
            "#
        };
        let row = sqlx::query_as::<_, BookRow>(query)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(Book::try_from).transpose()
    }

    async fn find_by_isbn(
        con: &mut PgConnection,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, isbn, title, author, category, description, total_copies,
                   available_copies, price, cover_image, cover_id, added_by, created_at
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Book::try_from).transpose()
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, isbn, title, author, category, description, total_copies,
                   available_copies, price, cover_image, cover_id, added_by, created_at
            FROM books
            ORDER BY title, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn find_latest(
        con: &mut PgConnection,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, isbn, title, author, category, description, total_copies,
                   available_copies, price, cover_image, cover_id, added_by, created_at
            FROM books
            ORDER BY created_at DESC, id
            LIMIT $1
            "#,
        )
        .bind(limit.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn count(con: &mut PgConnection) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(con)
            .await
            .convert_error()
    }

    async fn count_categories(con: &mut PgConnection) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT category) FROM books")
            .fetch_one(con)
            .await
            .convert_error()
    }

    async fn top_categories(
        con: &mut PgConnection,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<CategorySummary>, KernelError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            // language=postgresql
            r#"
            SELECT category,
                   COUNT(*) AS count,
                   (ARRAY_AGG(cover_image ORDER BY created_at)
                        FILTER (WHERE cover_image IS NOT NULL AND cover_image <> ''))[1] AS cover_image
            FROM books
            GROUP BY category
            ORDER BY count DESC, category
            LIMIT $1
            "#,
        )
        .bind(limit.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(CategorySummary::from).collect())
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO books (id, isbn, title, author, category, description, total_copies,
                               available_copies, price, cover_image, cover_id, added_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.isbn().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.category().as_ref())
        .bind(book.description().as_ref())
        .bind(book.copies().total())
        .bind(book.copies().available())
        .bind(book.price().as_ref())
        .bind(book.cover().as_ref().map(|cover| cover.url().clone()))
        .bind(book.cover().as_ref().and_then(|cover| cover.asset_id().clone()))
        .bind(book.added_by().as_ref().map(|user| *user.as_ref()))
        .bind(book.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE books
            SET isbn = $2, title = $3, author = $4, category = $5, description = $6,
                total_copies = $7, available_copies = $8, price = $9,
                cover_image = $10, cover_id = $11
            WHERE id = $1
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.isbn().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.category().as_ref())
        .bind(book.description().as_ref())
        .bind(book.copies().total())
        .bind(book.copies().available())
        .bind(book.price().as_ref())
        .bind(book.cover().as_ref().map(|cover| cover.url().clone()))
        .bind(book.cover().as_ref().and_then(|cover| cover.asset_id().clone()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn delete(con: &mut PgConnection, book_id: &BookId) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
