//! Borrow transitions raced against each other over real row locks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use application::service::BorrowLifecycleService;
use application::transfer::{BorrowDto, BorrowTransitionDto, RequestIssueDto};
use kernel::interface::cache::{CacheKey, CatalogCache, DependOnCatalogCache};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery};
use kernel::interface::update::{
    BookModifier, DependOnBookModifier, DependOnBorrowModifier, UserModifier,
};
use kernel::prelude::access::Actor;
use kernel::prelude::entity::{
    Book, BookAuthor, BookCategory, BookCopies, BookDescription, BookId, BookIsbn, BookPrice,
    BookTitle, CreatedAt, HashedPassword, Role, User, UserEmail, UserId, UserName,
};
use kernel::KernelError;

use crate::error::ConvertError;

use super::{
    PostgresBookRepository, PostgresBorrowRepository, PostgresDatabase, PostgresUserRepository,
};

struct Uncached;

#[async_trait::async_trait]
impl CatalogCache for Uncached {
    async fn get<T>(&self, _: &CacheKey) -> error_stack::Result<Option<T>, KernelError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        Ok(None)
    }

    async fn set<T>(&self, _: &CacheKey, _: &T) -> error_stack::Result<(), KernelError>
    where
        T: Serialize + Sync,
    {
        Ok(())
    }

    async fn invalidate(&self, _: &CacheKey) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

struct PostgresModule {
    db: PostgresDatabase,
    cache: Uncached,
}

impl DependOnDatabaseConnection for PostgresModule {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.db
    }
}

impl DependOnUserQuery for PostgresModule {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnBookQuery for PostgresModule {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier for PostgresModule {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

impl DependOnBorrowQuery for PostgresModule {
    type BorrowQuery = PostgresBorrowRepository;
    fn borrow_query(&self) -> &Self::BorrowQuery {
        &PostgresBorrowRepository
    }
}

impl DependOnBorrowModifier for PostgresModule {
    type BorrowModifier = PostgresBorrowRepository;
    fn borrow_modifier(&self) -> &Self::BorrowModifier {
        &PostgresBorrowRepository
    }
}

impl DependOnCatalogCache for PostgresModule {
    type CatalogCache = Uncached;
    fn catalog_cache(&self) -> &Self::CatalogCache {
        &self.cache
    }
}

impl PostgresModule {
    async fn new() -> error_stack::Result<Arc<Self>, KernelError> {
        let db = PostgresDatabase::new().await?;
        Ok(Arc::new(Self { db, cache: Uncached }))
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc().replace_nanosecond(0).unwrap()
    }

    /// Committed, so every racing transaction sees it.
    async fn seed_user(&self, role: Role) -> error_stack::Result<Actor, KernelError> {
        let id = UserId::new(Uuid::new_v4());
        let user = User::new(
            id.clone(),
            UserName::new("Racer"),
            UserEmail::new(format!("{}@college.edu", id.as_ref().simple())),
            role,
            None,
            None,
            CreatedAt::new(Self::now()),
        );
        let mut con = self.db.transact().await?;
        PostgresUserRepository
            .create(&mut con, &user, &HashedPassword::new("$2b$12$hash"))
            .await?;
        con.commit().await?;
        Ok(Actor::new(id, role))
    }

    async fn seed_book(&self, copies: i32) -> error_stack::Result<BookId, KernelError> {
        let id = Uuid::new_v4();
        let book = Book::new(
            BookId::new(id),
            BookIsbn::new(id.simple().to_string()),
            BookTitle::new("Operating System Concepts"),
            BookAuthor::new("Abraham Silberschatz"),
            BookCategory::new("Systems"),
            BookDescription::new(""),
            BookCopies::stocked(copies)?,
            BookPrice::new(600)?,
            None,
            None,
            CreatedAt::new(Self::now()),
        );
        let mut con = self.db.transact().await?;
        PostgresBookRepository.create(&mut con, &book).await?;
        con.commit().await?;
        Ok(book.id().clone())
    }

    async fn available(&self, book: &BookId) -> error_stack::Result<i32, KernelError> {
        let mut con = self.db.transact().await?;
        let book = PostgresBookRepository
            .find_by_id(&mut con, book)
            .await?
            .ok_or(KernelError::NotFound)?;
        Ok(book.copies().available())
    }

    async fn clean(&self, book: &BookId, users: &[&Actor]) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.transact().await?;
        sqlx::query("DELETE FROM borrows WHERE book_id = $1")
            .bind(book.as_ref())
            .execute(&mut *con)
            .await
            .convert_error()?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book.as_ref())
            .execute(&mut *con)
            .await
            .convert_error()?;
        for user in users {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user.id().as_ref())
                .execute(&mut *con)
                .await
                .convert_error()?;
        }
        con.commit().await
    }
}

type Outcome = error_stack::Result<BorrowDto, KernelError>;

/// Exactly one success, and the loser's error context.
fn settle(first: Outcome, second: Outcome) -> (BorrowDto, KernelError) {
    match (first, second) {
        (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, *lost.current_context()),
        (first, second) => panic!("expected one winner, got {first:?} and {second:?}"),
    }
}

async fn request_race(
    module: &Arc<PostgresModule>,
    first: Actor,
    second: Actor,
    book: &BookId,
) -> (Outcome, Outcome) {
    let book_id = *book.as_ref();
    let a = tokio::spawn({
        let module = Arc::clone(module);
        async move { module.request_issue(&first, RequestIssueDto { book_id }).await }
    });
    let b = tokio::spawn({
        let module = Arc::clone(module);
        async move { module.request_issue(&second, RequestIssueDto { book_id }).await }
    });
    (a.await.unwrap(), b.await.unwrap())
}

#[test_with::env(POSTGRES_TEST)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_copy_is_reserved_once() -> error_stack::Result<(), KernelError> {
    let module = PostgresModule::new().await?;
    let asha = module.seed_user(Role::Student).await?;
    let ravi = module.seed_user(Role::Student).await?;
    let book = module.seed_book(1).await?;

    let (first, second) = request_race(&module, asha.clone(), ravi.clone(), &book).await;
    let (won, lost) = settle(first, second);
    assert_eq!(won.status, "Requested");
    assert_eq!(lost, KernelError::Conflict);
    assert_eq!(module.available(&book).await?, 1);

    module.clean(&book, &[&asha, &ravi]).await
}

#[test_with::env(POSTGRES_TEST)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_open_request_per_student_and_book() -> error_stack::Result<(), KernelError> {
    let module = PostgresModule::new().await?;
    let asha = module.seed_user(Role::Student).await?;
    let book = module.seed_book(3).await?;

    let (first, second) = request_race(&module, asha.clone(), asha.clone(), &book).await;
    let (_, lost) = settle(first, second);
    assert_eq!(lost, KernelError::Conflict);

    module.clean(&book, &[&asha]).await
}

#[test_with::env(POSTGRES_TEST)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn request_is_approved_once() -> error_stack::Result<(), KernelError> {
    let module = PostgresModule::new().await?;
    let asha = module.seed_user(Role::Student).await?;
    let librarian = module.seed_user(Role::Librarian).await?;
    let admin = module.seed_user(Role::Admin).await?;
    let book = module.seed_book(2).await?;

    let borrow = module
        .request_issue(
            &asha,
            RequestIssueDto {
                book_id: *book.as_ref(),
            },
        )
        .await?;
    let id = borrow.id;

    let a = tokio::spawn({
        let module = Arc::clone(&module);
        let librarian = librarian.clone();
        async move { module.approve_issue(&librarian, BorrowTransitionDto { id }).await }
    });
    let b = tokio::spawn({
        let module = Arc::clone(&module);
        let admin = admin.clone();
        async move { module.approve_issue(&admin, BorrowTransitionDto { id }).await }
    });
    let (won, lost) = settle(a.await.unwrap(), b.await.unwrap());
    assert_eq!(won.status, "Issued");
    assert_eq!(lost, KernelError::InvalidState);
    assert_eq!(module.available(&book).await?, 1);

    module.clean(&book, &[&asha, &librarian, &admin]).await
}
